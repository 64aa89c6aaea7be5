//! Error types for the taggy-core crate.
//!
//! This module provides [`TimestampError`] for partial-date validation and
//! [`StorageError`] for the key/value slot that persists preferences.

use camino::Utf8PathBuf;

/// Errors produced while building or parsing a [`Timestamp`](crate::Timestamp).
///
/// # Examples
///
/// ```
/// use taggy_core::TimestampError;
///
/// let error = TimestampError::OutOfRange { component: "month", value: 13 };
/// assert!(error.to_string().contains("month"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The text does not follow the `YYYY/MM/dd@hh:mm:ss` layout.
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidFormat {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A component lies outside its calendar or clock range.
    #[error("{component} out of range: {value}")]
    OutOfRange {
        /// Name of the offending component.
        component: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// A finer component was given while a coarser one was missing.
    #[error("{component} requires {missing} to be present")]
    MissingCoarser {
        /// The component that was supplied.
        component: &'static str,
        /// The coarser component that was absent.
        missing: &'static str,
    },
}

impl TimestampError {
    /// Creates a new [`TimestampError::InvalidFormat`].
    #[must_use]
    pub fn invalid_format(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFormat {
            input: input.into(),
            reason,
        }
    }
}

/// Errors that can occur while reading or writing a persisted slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The slot key cannot be used as a file name.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// The backing directory could not be created.
    #[error("failed to create storage directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a slot failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The slot file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing a slot failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The slot file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The persisted state could not be serialized.
    #[error("failed to serialize persisted state: {0}")]
    Serialize(#[from] serde_json::Error),
}
