//! Error types for the taggy-drop crate.

use camino::Utf8PathBuf;

/// Errors that can occur while classifying a dropped path.
///
/// Each dropped path is classified on its own, so one of these never
/// affects the other paths of the same drop.
///
/// # Examples
///
/// ```
/// use taggy_drop::DropError;
/// use camino::Utf8PathBuf;
///
/// let error = DropError::RelativePath(Utf8PathBuf::from("music"));
/// assert_eq!(error.path(), "music");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DropError {
    /// The path could not be stat'ed.
    #[error("failed to inspect dropped path {path}: {source}")]
    Stat {
        /// The dropped path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The drop source delivered a relative path.
    #[error("dropped path is not absolute: {0}")]
    RelativePath(Utf8PathBuf),
}

impl DropError {
    /// Creates a new [`DropError::Stat`] error.
    #[inline]
    pub fn stat(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }

    /// Returns the dropped path this error is about.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Stat { path, .. } | Self::RelativePath(path) => path,
        }
    }
}
