//! Core types, preferences, and errors for the taggy audio tag editor.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Domain types ([`AudioFile`], [`Timestamp`], cover art, [`SaveRequest`])
//! - [`Preferences`] and the [`PersistedState`] blob
//! - [`KeyValueStore`] slots for persisting that blob
//! - Directory path normalization and containment
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod hash;
pub mod paths;
pub mod preferences;
pub mod storage;
pub mod types;

pub use error::{StorageError, TimestampError};
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set, fx_hash_set_with_capacity};
pub use paths::{is_within, normalize_path};
pub use preferences::{
    FilterField, PanelSizes, PersistedState, Preferences, STATE_KEY, SortCriterion,
    SortDirection, SortField, Theme,
};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{
    AUDIO_EXTENSIONS, AudioFile, Cover, CoverData, MimeType, Picture, SaveRequest, StagedCover,
    TagField, Timestamp, is_audio_path,
};
