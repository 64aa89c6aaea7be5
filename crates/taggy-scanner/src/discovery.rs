//! A read-only scan backend that discovers files without decoding tags.

use std::io::ErrorKind;

use async_trait::async_trait;
use camino::Utf8Path;
use tracing::{debug, info};

use crate::backend::ScanBackend;
use crate::error::ScanError;
use crate::stream::ScanStream;
use crate::walker::FileWalker;

/// A [`ScanBackend`] over the local filesystem that reports each audio file
/// as a record with its path and no tags.
///
/// Useful for headless listings and as a stand-in for the decoding backend.
///
/// # Examples
///
/// ```no_run
/// use taggy_scanner::{DiscoveryBackend, ScanBackend, ScanEvent};
/// use camino::Utf8Path;
///
/// # async fn run() -> Result<(), taggy_scanner::ScanError> {
/// let backend = DiscoveryBackend::new();
/// let mut stream = backend.scan(Utf8Path::new("/music")).await?;
/// while let Some(event) = stream.next_event().await {
///     if let ScanEvent::FileScanned(file) = event {
///         println!("{}", file.path);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiscoveryBackend {
    follow_links: bool,
}

impl DiscoveryBackend {
    /// Creates a backend that does not follow symbolic links.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            follow_links: false,
        }
    }

    /// Configures whether the walk follows symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

#[async_trait]
impl ScanBackend for DiscoveryBackend {
    async fn scan(&self, directory: &Utf8Path) -> Result<ScanStream, ScanError> {
        let metadata = tokio::fs::metadata(directory).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ScanError::NotFound(directory.to_owned())
            } else {
                ScanError::rejected(directory, source.to_string())
            }
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(directory.to_owned()));
        }

        let walker = FileWalker::new(directory).with_follow_links(self.follow_links);
        let (sender, stream) = ScanStream::channel();

        info!(%directory, "Scan accepted");
        tokio::task::spawn_blocking(move || {
            let summary = walker.stream_into(&sender);
            debug!(
                root = %walker.root(),
                files = summary.files,
                errors = summary.errors,
                disconnected = summary.disconnected,
                "Walk complete"
            );
        });

        Ok(stream)
    }
}
