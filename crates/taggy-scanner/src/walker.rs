//! Directory traversal for audio files.
//!
//! [`FileWalker`] uses the `ignore` crate to walk a directory tree, skipping
//! hidden entries and anything excluded by `.ignore` files, and yields the
//! files whose extension is one of [`AUDIO_EXTENSIONS`](taggy_core::AUDIO_EXTENSIONS).

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use taggy_core::{AudioFile, is_audio_path};
use tracing::debug;

use crate::ScanEvent;
use crate::error::ScanError;
use crate::stream::ScanSender;

/// Counters reported by [`FileWalker::stream_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Audio files sent.
    pub files: usize,
    /// Errors sent.
    pub errors: usize,
    /// Whether the consumer hung up before the walk ended.
    pub disconnected: bool,
}

/// A walker that discovers audio files in a directory tree.
///
/// Entries are visited in file-name order so repeated scans of an unchanged
/// tree report files in the same order.
///
/// # Examples
///
/// ```no_run
/// use taggy_scanner::FileWalker;
/// use camino::Utf8Path;
///
/// let walker = FileWalker::new(Utf8Path::new("/music"));
/// for path in walker.audio_files() {
///     println!("{}", path?);
/// }
/// # Ok::<(), taggy_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: Utf8PathBuf,
    follow_links: bool,
}

impl FileWalker {
    /// Creates a walker rooted at `root`.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            follow_links: false,
        }
    }

    /// Configures whether to follow symbolic links. Off by default.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Iterates over the audio files under the root.
    ///
    /// Walk failures are yielded as errors and the walk continues.
    pub fn audio_files(&self) -> impl Iterator<Item = Result<Utf8PathBuf, ScanError>> + use<> {
        self.build_walker().filter_map(|result| {
            let entry = match result {
                Ok(entry) => entry,
                Err(error) => return Some(Err(ScanError::Walk(error))),
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return None;
            }
            let path = entry.into_path();
            match Utf8PathBuf::from_path_buf(path) {
                Ok(path) if is_audio_path(&path) => Some(Ok(path)),
                Ok(_) => None,
                Err(path) => Some(Err(ScanError::NonUtf8Path(path))),
            }
        })
    }

    /// Walks the tree, sending one path-only record per audio file and one
    /// error event per failure, followed by [`ScanEvent::Finished`].
    ///
    /// Blocks the calling thread; run it on a blocking task.
    pub fn stream_into(&self, sender: &ScanSender) -> WalkSummary {
        let mut summary = WalkSummary::default();

        for result in self.audio_files() {
            let event = match result {
                Ok(path) => {
                    summary.files += 1;
                    ScanEvent::FileScanned(Box::new(AudioFile::new(path)))
                }
                Err(error) => {
                    summary.errors += 1;
                    ScanEvent::FileError {
                        path: error.path().cloned(),
                        error,
                    }
                }
            };
            if sender.blocking_send(event).is_err() {
                debug!(root = %self.root, "Scan consumer dropped, stopping walk");
                summary.disconnected = true;
                return summary;
            }
        }

        if sender.blocking_send(ScanEvent::Finished).is_err() {
            summary.disconnected = true;
        }
        summary
    }

    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .hidden(true)
            .ignore(true)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(self.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    }
}
