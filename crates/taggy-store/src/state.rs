//! The explicit owner of all frontend state.
//!
//! [`LibraryState`] holds the registry, the directory tracker, the selection,
//! the preferences, the drag overlay and pending notifications. Its mutators
//! are synchronous and keep the cross-cutting invariants:
//!
//! - upserting or deleting the selected path refreshes or clears the
//!   selection
//! - scan events only apply to the scan that currently owns a directory
//! - removing a directory deletes only files no surviving directory covers

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use taggy_core::{
    AudioFile, PersistedState, Preferences, SaveRequest, StagedCover, is_within,
};
use taggy_drop::{DragOverlay, DropEvent};
use taggy_scanner::{ScanError, ScanEvent};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::notify::{Notification, Notifications};
use crate::registry::Registry;
use crate::selection::Selection;
use crate::tracker::{DirectoryTracker, ScanTicket};
use crate::view::derive_visible;

/// What applying one scan event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanProgress {
    /// A file was recorded and upserted.
    Recorded,
    /// A per-file failure was logged.
    Failed,
    /// The scan reached its terminal event.
    Finished,
    /// The scan no longer owns its directory; the event was dropped.
    Stale,
}

/// All state of one session.
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    registry: Registry,
    tracker: DirectoryTracker,
    selection: Selection,
    preferences: Preferences,
    overlay: DragOverlay,
    notifications: Notifications,
}

impl LibraryState {
    /// Creates an empty state with the given preferences.
    #[must_use]
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The audio file registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The tracked directories.
    #[must_use]
    pub const fn tracker(&self) -> &DirectoryTracker {
        &self.tracker
    }

    /// The selection and edit session.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The current preferences.
    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// The drag overlay.
    #[must_use]
    pub const fn overlay(&self) -> DragOverlay {
        self.overlay
    }

    /// Pending notifications.
    #[must_use]
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// The visible files, keyed by path.
    #[must_use]
    pub fn visible_files(&self) -> BTreeMap<&Utf8Path, &AudioFile> {
        derive_visible(&self.registry, &self.tracker)
    }

    /// Returns `true` if `form` has unsaved changes against the selection.
    #[must_use]
    pub fn is_dirty(&self, form: &AudioFile) -> bool {
        self.selection.is_dirty(form)
    }

    /// The preferences and tracked directories as they are persisted.
    #[must_use]
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            preferences: self.preferences.clone(),
            directories: self.tracker.directories().cloned().collect(),
        }
    }

    // ========================================================================
    // Registry and selection
    // ========================================================================

    /// Inserts, overwrites or (with `None`) deletes the record for `path`.
    ///
    /// Upserting the selected path refreshes the selection snapshot in
    /// place; deleting it clears the selection.
    pub fn set_audio_file(&mut self, path: &Utf8Path, record: Option<AudioFile>) {
        match record {
            Some(mut record) => {
                if record.path != path {
                    warn!(%path, record = %record.path, "Record path differs from key, rekeying");
                    path.clone_into(&mut record.path);
                }
                if self.selection.is_selected(path) {
                    self.selection.refresh(record.clone());
                }
                self.registry.insert(record);
            }
            None => {
                self.registry.remove(path);
                if self.selection.is_selected(path) {
                    debug!(%path, "Selected file deleted, clearing selection");
                    self.selection.clear();
                }
            }
        }
    }

    /// Selects `path` (or nothing), reloading the snapshot and discarding any
    /// staged cover.
    pub fn select_file(&mut self, path: Option<Utf8PathBuf>) {
        let snapshot = path
            .as_deref()
            .and_then(|path| self.registry.get(path))
            .cloned();
        self.selection.select(path, snapshot);
    }

    /// Stages a cover change for the selected file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSelection`] when nothing is selected.
    pub fn stage_cover(&mut self, staged: StagedCover) -> Result<(), StoreError> {
        if self.selection.path().is_none() {
            return Err(StoreError::NoSelection);
        }
        self.selection.stage_cover(staged);
        Ok(())
    }

    /// Builds the save request for `record`.
    ///
    /// The staged replacement cover travels with the request only when
    /// `record` is the selected file and the cover is not being removed.
    #[must_use]
    pub fn save_request(&self, record: AudioFile, remove_cover: bool) -> SaveRequest {
        let cover = if !remove_cover && self.selection.is_selected(&record.path) {
            self.selection.staged_cover().replacement().cloned()
        } else {
            None
        };
        SaveRequest::new(record, cover, remove_cover)
    }

    /// Applies a save the backend accepted.
    ///
    /// The registry gets the saved record with its cover normalized to a
    /// displayable reference, and the staged cover is reset if the file is
    /// still selected and nothing new was staged since the request was
    /// built. Returns `false` (and changes nothing) when the file
    /// left the registry while the save was in flight.
    pub fn complete_save(&mut self, request: &SaveRequest) -> bool {
        let path = request.path();
        let Some(existing) = self.registry.get(path) else {
            warn!(%path, "Saved file is no longer tracked, not re-adding it");
            return false;
        };

        let cover = if request.remove_cover {
            None
        } else if let Some(staged) = &request.cover {
            Some(staged.display())
        } else {
            existing.cover.clone()
        };
        let mut saved = request.record.clone();
        saved.cover = cover;

        self.set_audio_file(path, Some(saved));
        if self.selection.is_selected(path) {
            if carries_staged_cover(request, self.selection.staged_cover()) {
                self.selection.stage_cover(StagedCover::Unchanged);
            } else {
                debug!(%path, "Keeping cover staged while the save was in flight");
            }
        }
        true
    }

    // ========================================================================
    // Directories and scans
    // ========================================================================

    /// Starts (or restarts) tracking `directory` as scanning with no files.
    pub fn begin_scan(&mut self, directory: Utf8PathBuf) -> ScanTicket {
        let ticket = self.tracker.begin_scan(directory);
        info!(directory = %ticket.directory, generation = ticket.generation, "Scan started");
        ticket
    }

    /// Applies one event of the scan identified by `ticket`.
    pub fn apply_scan_event(&mut self, ticket: &ScanTicket, event: ScanEvent) -> ScanProgress {
        if !self.tracker.is_current(ticket) {
            debug!(
                directory = %ticket.directory,
                generation = ticket.generation,
                "Dropping event of superseded scan"
            );
            return ScanProgress::Stale;
        }

        match event {
            ScanEvent::FileScanned(file) => {
                let file = *file;
                let path = file.path.clone();
                self.tracker.record_file(ticket, path.clone());
                self.set_audio_file(&path, Some(file));
                ScanProgress::Recorded
            }
            ScanEvent::FileError { path, error } => {
                warn!(
                    directory = %ticket.directory,
                    path = ?path,
                    %error,
                    "Failed to read audio file"
                );
                ScanProgress::Failed
            }
            ScanEvent::Finished => {
                self.tracker.finish_scan(ticket);
                ScanProgress::Finished
            }
        }
    }

    /// Records that the scan for `ticket` could not start.
    ///
    /// Clears the scanning flag and raises an error notification. A stale
    /// ticket changes nothing. Returns whether the failure was applied.
    pub fn fail_scan(&mut self, ticket: &ScanTicket, error: &ScanError) -> bool {
        if !self.tracker.finish_scan(ticket) {
            debug!(directory = %ticket.directory, %error, "Superseded scan failed to start");
            return false;
        }
        warn!(directory = %ticket.directory, %error, "Scan failed to start");
        self.notify(Notification::error(format!(
            "Could not scan {}: {error}",
            ticket.directory
        )));
        true
    }

    /// Stops tracking `directory` and deletes the files no surviving
    /// directory covers.
    ///
    /// Returns the number of deleted files, or `None` if the directory was
    /// not tracked.
    pub fn remove_directory(&mut self, directory: &Utf8Path) -> Option<usize> {
        self.tracker.remove(directory)?;

        if let Some(parent) = self
            .tracker
            .directories()
            .find(|survivor| is_within(directory, survivor))
        {
            info!(%directory, %parent, "Directory removed, files kept by parent");
            return Some(0);
        }

        let orphans: Vec<Utf8PathBuf> = self
            .registry
            .paths_within(directory)
            .into_iter()
            .filter(|path| !self.tracker.covers(path))
            .collect();
        for path in &orphans {
            self.set_audio_file(path, None);
        }
        info!(%directory, deleted = orphans.len(), "Directory removed");
        Some(orphans.len())
    }

    // ========================================================================
    // Preferences, drag and drop, notifications
    // ========================================================================

    /// Replaces the preferences.
    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    /// Edits the preferences in place.
    pub fn update_preferences(&mut self, update: impl FnOnce(&mut Preferences)) {
        update(&mut self.preferences);
    }

    /// Feeds a drag event to the overlay, returning the paths of a drop.
    pub fn apply_drop_event(&mut self, event: &DropEvent) -> Option<Vec<Utf8PathBuf>> {
        self.overlay.apply(event)
    }

    /// Queues a notification.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Removes and returns all pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }
}

/// Whether `request` already wrote what is staged, so the staged cover can be
/// reset after it lands.
fn carries_staged_cover(request: &SaveRequest, staged: &StagedCover) -> bool {
    match staged {
        StagedCover::Unchanged => true,
        StagedCover::Removed => request.remove_cover,
        StagedCover::Replaced(data) => request.cover.as_ref() == Some(data),
    }
}
