//! Error types for the taggy-scanner crate.
//!
//! - [`ScanError`] - failures of a directory scan, either when starting it
//!   or for one file of a running scan
//! - [`TagError`] - failures of tag writes and cover extraction

use camino::Utf8PathBuf;

/// Errors that can occur while scanning a directory.
///
/// # Error Recovery Strategy
///
/// - **Start failures** ([`ScanError::NotFound`], [`ScanError::NotADirectory`],
///   [`ScanError::Rejected`]): the scan never starts and no stream exists
/// - **Per-file failures** (everything else): reported on the stream, the
///   scan carries on with the next file
///
/// # Examples
///
/// ```
/// use taggy_scanner::ScanError;
/// use camino::Utf8PathBuf;
///
/// let err = ScanError::NotADirectory(Utf8PathBuf::from("/music/a.mp3"));
/// assert!(err.is_start_failure());
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The directory to scan does not exist.
    #[error("directory does not exist: {0}")]
    NotFound(Utf8PathBuf),

    /// The path to scan is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// The backend refused to start the scan.
    #[error("scan of {directory} rejected: {reason}")]
    Rejected {
        /// The directory that was to be scanned.
        directory: Utf8PathBuf,
        /// Why the backend refused.
        reason: String,
    },

    /// Failed to walk part of the directory tree.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file or directory.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The tags of an audio file could not be decoded.
    #[error("failed to decode tags of {path}: {reason}")]
    Decode {
        /// The audio file.
        path: Utf8PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Any other backend failure.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Decode`] error.
    #[inline]
    pub fn decode(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`ScanError::Rejected`] error.
    #[inline]
    pub fn rejected(directory: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            directory: directory.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error prevents a scan from starting.
    #[inline]
    #[must_use]
    pub const fn is_start_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::NotADirectory(_) | Self::Rejected { .. }
        )
    }

    /// Returns `true` if the scan can continue past this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Walk(_) | Self::Read { .. } | Self::Decode { .. } | Self::NonUtf8Path(_)
        )
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::NotFound(path)
            | Self::NotADirectory(path)
            | Self::Rejected {
                directory: path, ..
            }
            | Self::Read { path, .. }
            | Self::Decode { path, .. } => Some(path),
            Self::Walk(_) | Self::NonUtf8Path(_) | Self::Backend(_) => None,
        }
    }
}

/// Errors from tag writes and cover extraction.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The backend refused to write the file.
    #[error("failed to save {path}: {reason}")]
    Rejected {
        /// The audio file.
        path: Utf8PathBuf,
        /// Why the write was refused.
        reason: String,
    },

    /// The audio file carries no embedded artwork.
    #[error("no cover art in {0}")]
    NoCover(Utf8PathBuf),

    /// An I/O error while reading or writing the file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The audio file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Any other backend failure.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl TagError {
    /// Creates a new [`TagError::Rejected`] error.
    #[inline]
    pub fn rejected(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the audio file associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Rejected { path, .. } | Self::NoCover(path) | Self::Io { path, .. } => Some(path),
            Self::Backend(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_scan_error_start_failures() {
        for err in [
            ScanError::NotFound(Utf8PathBuf::from("/missing")),
            ScanError::NotADirectory(Utf8PathBuf::from("/music/a.mp3")),
            ScanError::rejected("/locked", "permission denied"),
        ] {
            assert!(err.is_start_failure(), "{err}");
            assert!(!err.is_recoverable(), "{err}");
            assert!(err.path().is_some());
        }
    }

    #[test]
    fn test_scan_error_read() {
        let err = ScanError::read("/music/a.mp3", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.is_recoverable());
        assert!(!err.is_start_failure());
        assert_eq!(err.path().map(|p| p.as_str()), Some("/music/a.mp3"));
        assert!(err.to_string().contains("/music/a.mp3"));
    }

    #[test]
    fn test_scan_error_decode() {
        let err = ScanError::decode("/music/b.flac", "bad frame header");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("bad frame header"));
    }

    #[test]
    fn test_scan_error_backend_is_transparent() {
        let err = ScanError::from(anyhow::anyhow!("decoder crashed"));
        assert_eq!(err.to_string(), "decoder crashed");
        assert!(err.path().is_none());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_scan_error_non_utf8() {
        let err = ScanError::NonUtf8Path(std::path::PathBuf::from("test"));
        assert!(err.is_recoverable());
        assert!(err.path().is_none());
    }

    #[test]
    fn test_tag_error_paths() {
        let err = TagError::rejected("/music/a.mp3", "read-only file");
        assert_eq!(err.path().map(|p| p.as_str()), Some("/music/a.mp3"));
        assert!(err.to_string().contains("read-only file"));

        let err = TagError::NoCover(Utf8PathBuf::from("/music/b.mp3"));
        assert_eq!(err.to_string(), "no cover art in /music/b.mp3");
    }
}
