//! The interactive directory prompt behind `add_directory(None)`.

use async_trait::async_trait;
use camino::Utf8PathBuf;

/// Asks the user for a directory.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Returns the picked directory, or `None` if the user cancelled.
    async fn pick_directory(&self) -> Option<Utf8PathBuf>;
}
