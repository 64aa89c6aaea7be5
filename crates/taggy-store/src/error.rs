//! Error types for store operations.

use taggy_core::StorageError;
use taggy_drop::DropError;
use taggy_scanner::{ScanError, TagError};
use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations.
///
/// Every error is also reported as a user notification by the operation
/// that raised it, so callers may ignore the value.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not start a scan.
    #[error("scan failed to start: {0}")]
    Scan(#[from] ScanError),

    /// The backend rejected a save or cover extraction.
    #[error("tag operation failed: {0}")]
    Tag(#[from] TagError),

    /// A dropped path could not be inspected.
    #[error("dropped path failed: {0}")]
    Drop(#[from] DropError),

    /// The persisted state could not be written.
    #[error("failed to persist state: {0}")]
    Storage(#[from] StorageError),

    /// The operation needs a selected file.
    #[error("no file is selected")]
    NoSelection,

    /// The store was built without a tag backend.
    #[error("no tag backend is configured")]
    NoTagBackend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_source() {
        let error = StoreError::from(ScanError::rejected("/music", "permission denied"));
        let message = error.to_string();
        assert!(message.starts_with("scan failed to start"));
        assert!(message.contains("permission denied"));
        assert_eq!(StoreError::NoSelection.to_string(), "no file is selected");
    }
}
