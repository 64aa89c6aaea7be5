//! Domain types for the tag editor.
//!
//! - [`file`] - the [`AudioFile`] record and [`SaveRequest`]
//! - [`field`] - [`TagField`], the addressable tags
//! - [`timestamp`] - partial calendar [`Timestamp`]s
//! - [`cover`] - cover art payloads and the staged-cover state
//!
//! Everything is re-exported at the crate root:
//!
//! ```
//! use taggy_core::{AudioFile, Cover, CoverData, StagedCover, Timestamp};
//! ```

mod cover;
mod field;
mod file;
mod timestamp;

pub use cover::{Cover, CoverData, MimeType, Picture, StagedCover};
pub use field::TagField;
pub use file::{AUDIO_EXTENSIONS, AudioFile, SaveRequest, is_audio_path};
pub use timestamp::Timestamp;
