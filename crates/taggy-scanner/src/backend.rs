//! Contracts of the host backend that reads and writes audio files.

use async_trait::async_trait;
use camino::Utf8Path;
use taggy_core::{Picture, SaveRequest};

use crate::error::{ScanError, TagError};
use crate::stream::ScanStream;

/// Enumerates and decodes the audio files under a directory.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Starts a recursive scan of `directory`.
    ///
    /// Resolves once the backend has accepted the request, not when the
    /// scan completes. Results arrive on the returned stream, terminated by
    /// [`ScanEvent::Finished`](crate::ScanEvent::Finished).
    ///
    /// # Errors
    ///
    /// Returns a start failure (see [`ScanError::is_start_failure`]) when
    /// the scan cannot begin. No stream exists in that case.
    async fn scan(&self, directory: &Utf8Path) -> Result<ScanStream, ScanError>;
}

/// Writes tags and extracts embedded artwork.
#[async_trait]
pub trait TagBackend: Send + Sync {
    /// Writes the tags of one file.
    ///
    /// On success the caller assumes the file now holds exactly what was
    /// sent.
    async fn save(&self, request: SaveRequest) -> Result<(), TagError>;

    /// Extracts the embedded cover of an audio file.
    async fn extract_cover(&self, audio_path: &Utf8Path) -> Result<Picture, TagError>;
}
