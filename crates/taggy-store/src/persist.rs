//! Write-through of preferences and tracked directories to a key/value slot.

use std::sync::Arc;

use taggy_core::{KeyValueStore, PersistedState, STATE_KEY, StorageError};
use tracing::{debug, warn};

/// Loads the persisted state once and writes it back whenever it changes.
///
/// Writes are wholesale and skipped when the serialized blob equals the last
/// one read or written.
pub struct PreferenceSync {
    store: Arc<dyn KeyValueStore>,
    key: String,
    last_written: Option<String>,
}

impl PreferenceSync {
    /// Syncs through the `taggy.state` slot of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, STATE_KEY)
    }

    /// Syncs through a custom slot.
    #[must_use]
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last_written: None,
        }
    }

    /// Reads the slot, falling back to defaults for whatever is missing or
    /// unreadable.
    pub fn load(&mut self) -> PersistedState {
        match self.store.get(&self.key) {
            Ok(Some(blob)) => {
                let state = PersistedState::from_blob(&blob);
                debug!(
                    key = %self.key,
                    directories = state.directories.len(),
                    "Loaded persisted state"
                );
                self.last_written = Some(blob);
                state
            }
            Ok(None) => {
                debug!(key = %self.key, "No persisted state, using defaults");
                PersistedState::default()
            }
            Err(error) => {
                warn!(key = %self.key, %error, "Failed to read persisted state, using defaults");
                PersistedState::default()
            }
        }
    }

    /// Writes `state` if it differs from the last known blob.
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn sync(&mut self, state: &PersistedState) -> Result<bool, StorageError> {
        let blob = state.to_blob()?;
        if self.last_written.as_deref() == Some(blob.as_str()) {
            return Ok(false);
        }
        self.store.set(&self.key, &blob)?;
        self.last_written = Some(blob);
        Ok(true)
    }
}

impl std::fmt::Debug for PreferenceSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceSync")
            .field("key", &self.key)
            .field("synced", &self.last_written.is_some())
            .finish_non_exhaustive()
    }
}
