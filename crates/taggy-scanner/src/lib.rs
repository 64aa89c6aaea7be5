//! Directory scan channel protocol and backend contracts for taggy.
//!
//! The host backend walks directories and decodes tags; this crate defines
//! how the state core talks to it:
//!
//! - [`ScanBackend`]: starts a scan and hands back a [`ScanStream`]
//! - [`ScanEvent`]: one per-file result, then a terminal [`ScanEvent::Finished`]
//! - [`TagBackend`]: writes tags and extracts embedded artwork
//!
//! It also ships [`DiscoveryBackend`], a filesystem-only [`ScanBackend`]
//! built on [`FileWalker`].
//!
//! # Protocol
//!
//! ```text
//! scan(dir) ──► Err(start failure)          no stream, no events
//!           └─► Ok(stream) ──► FileScanned / FileError (any order, any count)
//!                          └─► Finished     (exactly once, always last)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod backend;
mod discovery;
mod error;
mod stream;
mod walker;

pub use backend::{ScanBackend, TagBackend};
pub use discovery::DiscoveryBackend;
pub use error::{ScanError, TagError};
pub use stream::{SCAN_CHANNEL_CAPACITY, ScanSender, ScanStream};
pub use walker::{FileWalker, WalkSummary};

use camino::Utf8PathBuf;
use taggy_core::AudioFile;

/// One message of a scan stream.
///
/// The `FileScanned` variant is boxed since [`AudioFile`] is much larger
/// than the other variants.
#[derive(Debug)]
pub enum ScanEvent {
    /// A file was decoded successfully.
    FileScanned(Box<AudioFile>),

    /// A file (or part of the tree) could not be processed.
    ///
    /// The scan continues; nothing is added to the registry for it.
    FileError {
        /// The offending path, when known.
        path: Option<Utf8PathBuf>,
        /// What went wrong.
        error: ScanError,
    },

    /// No further events follow for this scan.
    Finished,
}

impl ScanEvent {
    /// Returns `true` for [`ScanEvent::Finished`].
    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}
