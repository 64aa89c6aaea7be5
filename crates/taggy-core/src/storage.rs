//! Key/value slots for persisted state.
//!
//! The application persists a single JSON blob (see
//! [`PersistedState`](crate::PersistedState)). [`KeyValueStore`] abstracts
//! where it lives:
//!
//! - [`MemoryStore`] - process-local, for tests and ephemeral sessions
//! - [`JsonFileStore`] - one `<key>.json` file per slot in a directory

use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::StorageError;
use crate::hash::{FxHashMap, fx_hash_map};

/// A store of named string slots.
pub trait KeyValueStore: Send + Sync {
    /// Reads a slot. A slot that was never written reads as `None`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the content of a slot.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// An in-memory [`KeyValueStore`].
///
/// # Examples
///
/// ```
/// use taggy_core::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// assert_eq!(store.get("k")?, None);
/// store.set("k", "v")?;
/// assert_eq!(store.get("k")?.as_deref(), Some("v"));
/// # Ok::<(), taggy_core::StorageError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(fx_hash_map()),
        }
    }

    /// Creates a store with one slot already written.
    #[must_use]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.slots.lock().insert(key.to_owned(), value.to_owned());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A [`KeyValueStore`] keeping each slot in `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous content intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: Utf8PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the slot files.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the file backing a slot.
    pub fn slot_path(&self, key: &str) -> Result<Utf8PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let staging = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&staging, value).map_err(|source| StorageError::Write {
            path: staging.clone(),
            source,
        })?;
        std::fs::rename(&staging, &path).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(%path, bytes = value.len(), "Slot written");
        Ok(())
    }
}
