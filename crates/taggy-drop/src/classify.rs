//! Classification of dropped paths into directories and files.

use async_trait::async_trait;
use camino::Utf8Path;
use tracing::debug;

use crate::error::DropError;

/// What a dropped path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A directory, to be tracked and scanned.
    Directory,
    /// Anything else.
    File,
}

/// The filesystem stat used to classify dropped paths.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Returns what `path` points at, following symbolic links.
    async fn kind(&self, path: &Utf8Path) -> std::io::Result<PathKind>;
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn kind(&self, path: &Utf8Path) -> std::io::Result<PathKind> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(if metadata.is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        })
    }
}

/// Classifies one dropped path.
///
/// # Errors
///
/// Returns [`DropError::RelativePath`] for relative paths and
/// [`DropError::Stat`] when the path cannot be inspected.
pub async fn classify_path(fs: &dyn FileSystem, path: &Utf8Path) -> Result<PathKind, DropError> {
    if !path.is_absolute() {
        return Err(DropError::RelativePath(path.to_owned()));
    }
    let kind = fs
        .kind(path)
        .await
        .map_err(|source| DropError::stat(path, source))?;
    debug!(%path, ?kind, "Classified dropped path");
    Ok(kind)
}
