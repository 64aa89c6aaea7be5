//! The shared state handle and its asynchronous operations.
//!
//! [`Store`] wraps [`LibraryState`] in an `Arc<Mutex<_>>` together with the
//! backends it talks to. The lock is only ever taken between suspension
//! points, so concurrent scans interleave event by event but every
//! mutation is applied whole.
//!
//! ```text
//!  add_directory ──► begin_scan ──► ScanBackend::scan ──► next_event ... Finished
//!        │               │                                     │
//!        │               └── persist                           └── apply_scan_event
//!        └── DirectoryPicker (when no path is given)
//! ```

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use futures_util::future::join_all;
use parking_lot::Mutex;
use taggy_core::{
    AudioFile, CoverData, KeyValueStore, MemoryStore, Preferences, StagedCover, fx_hash_set,
    normalize_path,
};
use taggy_drop::{DragOverlay, DropEvent, FileSystem, PathKind, TokioFileSystem, classify_path};
use taggy_scanner::{ScanBackend, TagBackend};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::notify::Notification;
use crate::persist::PreferenceSync;
use crate::picker::DirectoryPicker;
use crate::query;
use crate::selection::Selection;
use crate::state::{LibraryState, ScanProgress};
use crate::tracker::{DirectoryEntry, ScanTicket};

/// Outcome of one completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// The scanned directory.
    pub directory: Utf8PathBuf,
    /// Files recorded.
    pub files: usize,
    /// Per-file failures.
    pub failures: usize,
    /// The directory was removed or rescanned before this scan finished,
    /// so some of its events were dropped.
    pub stale: bool,
}

impl ScanSummary {
    fn new(directory: Utf8PathBuf) -> Self {
        Self {
            directory,
            files: 0,
            failures: 0,
            stale: false,
        }
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scanned {} files in {}", self.files, self.directory)?;
        if self.failures > 0 {
            write!(f, " ({} failed)", self.failures)?;
        }
        Ok(())
    }
}

/// Per-directory results of a batch of scans.
pub type ScanResults = Vec<(Utf8PathBuf, Result<ScanSummary, StoreError>)>;

/// What happened to one dropped path.
#[derive(Debug)]
pub enum DropAction {
    /// The path was a directory and has been scanned.
    Scanned(ScanSummary),
    /// The path was not a directory and was left alone.
    SkippedFile,
}

/// Result of ingesting one dropped path.
#[derive(Debug)]
pub struct DropOutcome {
    /// The dropped path.
    pub path: Utf8PathBuf,
    /// What was done with it.
    pub result: Result<DropAction, StoreError>,
}

/// Builder for [`Store`].
pub struct StoreBuilder {
    scanner: Arc<dyn ScanBackend>,
    tags: Option<Arc<dyn TagBackend>>,
    filesystem: Arc<dyn FileSystem>,
    picker: Option<Arc<dyn DirectoryPicker>>,
    storage: Arc<dyn KeyValueStore>,
}

impl StoreBuilder {
    /// Starts a builder around the scan backend. Preferences go to a
    /// [`MemoryStore`] and dropped paths are inspected with `tokio::fs`
    /// unless overridden.
    #[must_use]
    pub fn new(scanner: Arc<dyn ScanBackend>) -> Self {
        Self {
            scanner,
            tags: None,
            filesystem: Arc::new(TokioFileSystem),
            picker: None,
            storage: Arc::new(MemoryStore::new()),
        }
    }

    /// Sets the backend that saves tags and extracts covers.
    #[must_use]
    pub fn tag_backend(mut self, tags: Arc<dyn TagBackend>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Sets the filesystem used to classify dropped paths.
    #[must_use]
    pub fn file_system(mut self, filesystem: Arc<dyn FileSystem>) -> Self {
        self.filesystem = filesystem;
        self
    }

    /// Sets the directory prompt.
    #[must_use]
    pub fn picker(mut self, picker: Arc<dyn DirectoryPicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Sets where preferences and tracked directories are persisted.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = storage;
        self
    }

    /// Builds the store with default preferences and nothing tracked. Call
    /// [`Store::restore`] to load the persisted state.
    #[must_use]
    pub fn build(self) -> Store {
        Store {
            inner: Arc::new(Inner {
                state: Mutex::new(LibraryState::default()),
                sync: Mutex::new(PreferenceSync::new(self.storage)),
                scanner: self.scanner,
                tags: self.tags,
                filesystem: self.filesystem,
                picker: self.picker,
            }),
        }
    }
}

struct Inner {
    state: Mutex<LibraryState>,
    sync: Mutex<PreferenceSync>,
    scanner: Arc<dyn ScanBackend>,
    tags: Option<Arc<dyn TagBackend>>,
    filesystem: Arc<dyn FileSystem>,
    picker: Option<Arc<dyn DirectoryPicker>>,
}

/// Cloneable handle to the session state.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use taggy_scanner::DiscoveryBackend;
/// use taggy_store::Store;
///
/// # async fn demo() {
/// let store = Store::builder(Arc::new(DiscoveryBackend::new())).build();
/// store.add_directory(Some("/music".into())).await.ok();
/// for file in store.visible_files() {
///     println!("{}", file.path);
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Store")
            .field("files", &state.registry().len())
            .field("directories", &state.tracker().len())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Starts building a store around `scanner`.
    #[must_use]
    pub fn builder(scanner: Arc<dyn ScanBackend>) -> StoreBuilder {
        StoreBuilder::new(scanner)
    }

    // ========================================================================
    // Directories
    // ========================================================================

    /// Loads the persisted preferences and rescans every persisted
    /// directory concurrently.
    ///
    /// All directories are tracked before the first scan starts, so a
    /// failing scan never drops its siblings from the persisted list.
    pub async fn restore(&self) -> ScanResults {
        let persisted = self.inner.sync.lock().load();

        let tickets: Vec<ScanTicket> = {
            let mut seen = fx_hash_set();
            let mut state = self.inner.state.lock();
            state.set_preferences(persisted.preferences);
            persisted
                .directories
                .iter()
                .map(|directory| normalize_path(directory))
                .filter(|directory| {
                    !directory.as_str().is_empty() && seen.insert(directory.clone())
                })
                .map(|directory| state.begin_scan(directory))
                .collect()
        };
        info!(directories = tickets.len(), "Restoring tracked directories");

        self.persist();
        self.run_scans(tickets).await
    }

    /// Tracks and scans `directory`, or a directory from the picker when
    /// `None`.
    ///
    /// Adding a tracked directory again rescans it from scratch. Returns
    /// `Ok(None)` when the pick was cancelled or no picker is configured.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Scan`] when the backend cannot start the scan.
    /// The directory stays tracked with its scanning flag cleared.
    pub async fn add_directory(
        &self,
        directory: Option<Utf8PathBuf>,
    ) -> Result<Option<ScanSummary>, StoreError> {
        let directory = match directory {
            Some(directory) => directory,
            None => {
                let Some(picker) = self.inner.picker.as_deref() else {
                    debug!("No directory picker configured");
                    return Ok(None);
                };
                match picker.pick_directory().await {
                    Some(directory) => directory,
                    None => {
                        debug!("Directory pick cancelled");
                        return Ok(None);
                    }
                }
            }
        };

        let directory = normalize_path(&directory);
        if directory.as_str().is_empty() {
            return Ok(None);
        }
        self.scan_directory(directory).await.map(Some)
    }

    /// Stops tracking `directory`, deleting files no other tracked directory
    /// covers.
    ///
    /// Returns the number of deleted files, or `None` if the directory was
    /// not tracked. A scan still running for it finishes in the background
    /// and its results are dropped.
    pub fn remove_directory(&self, directory: &Utf8Path) -> Option<usize> {
        let directory = normalize_path(directory);
        let deleted = self.inner.state.lock().remove_directory(&directory);
        if deleted.is_some() {
            self.persist();
        }
        deleted
    }

    /// Rescans every tracked directory concurrently.
    pub async fn rescan_all(&self) -> ScanResults {
        let tickets: Vec<ScanTicket> = {
            let mut state = self.inner.state.lock();
            let directories: Vec<Utf8PathBuf> = state.tracker().directories().cloned().collect();
            directories
                .into_iter()
                .map(|directory| state.begin_scan(directory))
                .collect()
        };
        self.run_scans(tickets).await
    }

    async fn scan_directory(&self, directory: Utf8PathBuf) -> Result<ScanSummary, StoreError> {
        let ticket = self.inner.state.lock().begin_scan(directory);
        self.persist();
        self.run_scan(ticket).await
    }

    async fn run_scans(&self, tickets: Vec<ScanTicket>) -> ScanResults {
        join_all(tickets.into_iter().map(|ticket| async move {
            let directory = ticket.directory.clone();
            (directory, self.run_scan(ticket).await)
        }))
        .await
    }

    async fn run_scan(&self, ticket: ScanTicket) -> Result<ScanSummary, StoreError> {
        let started = self.inner.scanner.scan(&ticket.directory).await;
        let mut stream = match started {
            Ok(stream) => stream,
            Err(error) => {
                self.inner.state.lock().fail_scan(&ticket, &error);
                return Err(error.into());
            }
        };

        let mut summary = ScanSummary::new(ticket.directory.clone());
        while let Some(event) = stream.next_event().await {
            let progress = self.inner.state.lock().apply_scan_event(&ticket, event);
            match progress {
                ScanProgress::Recorded => summary.files += 1,
                ScanProgress::Failed => summary.failures += 1,
                ScanProgress::Stale => summary.stale = true,
                ScanProgress::Finished => {}
            }
        }

        if summary.stale {
            debug!(directory = %summary.directory, "Scan superseded before it finished");
        } else {
            info!(
                directory = %summary.directory,
                files = summary.files,
                failures = summary.failures,
                "Scan finished"
            );
            self.notify(Notification::info(summary.to_string()));
        }
        Ok(summary)
    }

    // ========================================================================
    // Selection and editing
    // ========================================================================

    /// Selects `path` (or nothing), discarding any staged cover.
    pub fn select_file(&self, path: Option<Utf8PathBuf>) {
        self.inner.state.lock().select_file(path);
    }

    /// Stages a cover change for the selected file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSelection`] when nothing is selected.
    pub fn stage_cover(&self, staged: StagedCover) -> Result<(), StoreError> {
        self.inner.state.lock().stage_cover(staged)
    }

    /// Stages the embedded artwork of another audio file as the new cover.
    ///
    /// The cover is dropped if the selection changed while it was being
    /// extracted.
    ///
    /// # Errors
    ///
    /// Fails when nothing is selected, no tag backend is configured, or the
    /// backend cannot extract a cover.
    pub async fn stage_cover_from_audio(&self, audio_path: &Utf8Path) -> Result<(), StoreError> {
        let selected = self
            .inner
            .state
            .lock()
            .selection()
            .path()
            .map(Utf8Path::to_owned)
            .ok_or(StoreError::NoSelection)?;
        let tags = self.tag_backend()?;

        match tags.extract_cover(audio_path).await {
            Ok(picture) => {
                debug!(source = %audio_path, bytes = picture.len(), "Extracted cover");
                let mut state = self.inner.state.lock();
                if !state.selection().is_selected(&selected) {
                    debug!(
                        source = %audio_path,
                        %selected,
                        "Selection changed during extraction, dropping cover"
                    );
                    return Ok(());
                }
                state.stage_cover(StagedCover::Replaced(CoverData::Embedded {
                    source: audio_path.to_owned(),
                    picture,
                }))
            }
            Err(error) => {
                warn!(source = %audio_path, %error, "Failed to extract cover");
                self.notify(Notification::error(format!(
                    "Could not read cover of {audio_path}: {error}"
                )));
                Err(error.into())
            }
        }
    }

    /// Saves `record` through the tag backend.
    ///
    /// On success the registry holds the saved record and, if it is still
    /// selected, the staged cover is cleared. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Tag`] when the backend rejects the save and
    /// [`StoreError::NoTagBackend`] when there is no backend.
    pub async fn commit_edit(
        &self,
        record: AudioFile,
        remove_cover: bool,
    ) -> Result<(), StoreError> {
        let tags = self.tag_backend()?;
        let request = self.inner.state.lock().save_request(record, remove_cover);
        let path = request.path().to_owned();

        if let Err(error) = tags.save(request.clone()).await {
            warn!(%path, %error, "Failed to save tags");
            self.notify(Notification::error(format!("Could not save {path}: {error}")));
            return Err(error.into());
        }

        if self.inner.state.lock().complete_save(&request) {
            info!(%path, remove_cover, "Saved tags");
        }
        Ok(())
    }

    /// Saves the working `form` of the selected file, removing the cover if
    /// that is what is staged.
    ///
    /// # Errors
    ///
    /// See [`Store::commit_edit`].
    pub async fn commit_selected(&self, form: AudioFile) -> Result<(), StoreError> {
        let remove_cover = matches!(
            self.inner.state.lock().selection().staged_cover(),
            StagedCover::Removed
        );
        self.commit_edit(form, remove_cover).await
    }

    fn tag_backend(&self) -> Result<&dyn TagBackend, StoreError> {
        self.inner.tags.as_deref().ok_or_else(|| {
            self.notify(Notification::error("Tag editing is not available"));
            StoreError::NoTagBackend
        })
    }

    // ========================================================================
    // Drag and drop
    // ========================================================================

    /// Handles a drag event. A drop stats every path concurrently and adds
    /// the directories among them; each failure is reported on its own.
    pub async fn handle_drop(&self, event: DropEvent) -> Vec<DropOutcome> {
        let dropped = self.inner.state.lock().apply_drop_event(&event);
        let Some(paths) = dropped else {
            return Vec::new();
        };
        debug!(paths = paths.len(), "Paths dropped");
        join_all(paths.into_iter().map(|path| self.ingest_dropped(path))).await
    }

    async fn ingest_dropped(&self, path: Utf8PathBuf) -> DropOutcome {
        let result = match classify_path(self.inner.filesystem.as_ref(), &path).await {
            Ok(PathKind::Directory) => self
                .scan_directory(normalize_path(&path))
                .await
                .map(DropAction::Scanned),
            Ok(PathKind::File) => {
                debug!(%path, "Ignoring dropped file");
                Ok(DropAction::SkippedFile)
            }
            Err(error) => {
                warn!(%path, %error, "Failed to inspect dropped path");
                self.notify(Notification::error(error.to_string()));
                Err(error.into())
            }
        };
        DropOutcome { path, result }
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Edits the preferences and persists them.
    pub fn update_preferences(&self, update: impl FnOnce(&mut Preferences)) {
        self.inner.state.lock().update_preferences(update);
        self.persist();
    }

    /// Writes preferences and tracked directories if they changed.
    ///
    /// Lock order: sync, then state.
    fn persist(&self) {
        let result = {
            let mut sync = self.inner.sync.lock();
            let snapshot = self.inner.state.lock().persisted_state();
            sync.sync(&snapshot)
        };
        match result {
            Ok(true) => debug!("Persisted state"),
            Ok(false) => {}
            Err(error) => {
                warn!(%error, "Failed to persist state");
                self.notify(Notification::error(format!("Could not save settings: {error}")));
            }
        }
    }

    fn notify(&self, notification: Notification) {
        self.inner.state.lock().notify(notification);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Runs `read` against the locked state.
    pub fn with_state<R>(&self, read: impl FnOnce(&LibraryState) -> R) -> R {
        read(&*self.inner.state.lock())
    }

    /// The visible files, ordered by path.
    #[must_use]
    pub fn visible_files(&self) -> Vec<AudioFile> {
        self.with_state(|state| state.visible_files().into_values().cloned().collect())
    }

    /// The visible files matching `search`, ordered by the configured sort
    /// criteria.
    #[must_use]
    pub fn query(&self, search: &str) -> Vec<AudioFile> {
        self.with_state(|state| {
            let visible = state.visible_files();
            query::run(visible.into_values(), search, state.preferences())
                .into_iter()
                .map(|hit| hit.file.clone())
                .collect()
        })
    }

    /// The tracked directories and their entries, ordered by path.
    #[must_use]
    pub fn directories(&self) -> Vec<(Utf8PathBuf, DirectoryEntry)> {
        self.with_state(|state| {
            state
                .tracker()
                .entries()
                .map(|(directory, entry)| (directory.clone(), entry.clone()))
                .collect()
        })
    }

    /// The entry of one tracked directory.
    #[must_use]
    pub fn directory(&self, directory: &Utf8Path) -> Option<DirectoryEntry> {
        self.with_state(|state| state.tracker().get(directory).cloned())
    }

    /// The registry record for `path`.
    #[must_use]
    pub fn audio_file(&self, path: &Utf8Path) -> Option<AudioFile> {
        self.with_state(|state| state.registry().get(path).cloned())
    }

    /// The selection and edit session.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.with_state(|state| state.selection().clone())
    }

    /// Returns `true` if `form` has unsaved changes.
    #[must_use]
    pub fn is_dirty(&self, form: &AudioFile) -> bool {
        self.with_state(|state| state.is_dirty(form))
    }

    /// Removes and returns pending notifications.
    #[must_use]
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.inner.state.lock().take_notifications()
    }

    /// The current preferences.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        self.with_state(|state| state.preferences().clone())
    }

    /// The drag overlay.
    #[must_use]
    pub fn overlay(&self) -> DragOverlay {
        self.with_state(LibraryState::overlay)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use async_trait::async_trait;
    use taggy_core::{
        Cover, FxHashMap, MimeType, PersistedState, Picture, STATE_KEY, SaveRequest, TagField,
        Theme,
    };
    use taggy_scanner::{ScanError, ScanEvent, ScanSender, ScanStream, TagError};
    use tokio::sync::{Notify, mpsc};

    use super::*;

    fn dir(path: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(path)
    }

    fn scanned(path: &str) -> ScanEvent {
        ScanEvent::FileScanned(Box::new(AudioFile::new(path)))
    }

    /// Replays a fixed tree per directory. Paths ending in `.bad` are
    /// reported as per-file failures; unknown directories are rejected.
    #[derive(Default)]
    struct ScriptedScanner {
        trees: FxHashMap<Utf8PathBuf, Vec<Utf8PathBuf>>,
    }

    impl ScriptedScanner {
        fn with_tree(mut self, directory: &str, files: &[&str]) -> Self {
            self.trees
                .insert(dir(directory), files.iter().map(|file| dir(file)).collect());
            self
        }
    }

    #[async_trait]
    impl ScanBackend for ScriptedScanner {
        async fn scan(&self, directory: &Utf8Path) -> Result<ScanStream, ScanError> {
            let Some(files) = self.trees.get(directory) else {
                return Err(ScanError::NotFound(directory.to_owned()));
            };
            let mut events: Vec<ScanEvent> = files
                .iter()
                .map(|path| {
                    if path.as_str().ends_with(".bad") {
                        ScanEvent::FileError {
                            path: Some(path.clone()),
                            error: ScanError::decode(path, "unreadable"),
                        }
                    } else {
                        scanned(path.as_str())
                    }
                })
                .collect();
            events.push(ScanEvent::Finished);
            Ok(ScanStream::from_events(events))
        }
    }

    /// Hands the sending half of every scan to the test.
    struct ManualScanner {
        handoff: mpsc::UnboundedSender<ScanSender>,
    }

    #[async_trait]
    impl ScanBackend for ManualScanner {
        async fn scan(&self, _directory: &Utf8Path) -> Result<ScanStream, ScanError> {
            let (sender, stream) = ScanStream::channel();
            self.handoff
                .send(sender)
                .map_err(|_| ScanError::rejected("/", "test ended"))?;
            Ok(stream)
        }
    }

    #[derive(Default)]
    struct RecordingTags {
        saved: parking_lot::Mutex<Vec<SaveRequest>>,
        reject: bool,
        cover: Option<Picture>,
    }

    #[async_trait]
    impl TagBackend for RecordingTags {
        async fn save(&self, request: SaveRequest) -> Result<(), TagError> {
            if self.reject {
                return Err(TagError::rejected(request.path(), "file is read-only"));
            }
            self.saved.lock().push(request);
            Ok(())
        }

        async fn extract_cover(&self, audio_path: &Utf8Path) -> Result<Picture, TagError> {
            self.cover
                .clone()
                .ok_or_else(|| TagError::NoCover(audio_path.to_owned()))
        }
    }

    struct FakeFileSystem {
        directories: Vec<Utf8PathBuf>,
    }

    #[async_trait]
    impl FileSystem for FakeFileSystem {
        async fn kind(&self, path: &Utf8Path) -> io::Result<PathKind> {
            if self.directories.iter().any(|directory| directory == path) {
                Ok(PathKind::Directory)
            } else if path.extension().is_some() {
                Ok(PathKind::File)
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }
    }

    struct FixedPicker(Option<Utf8PathBuf>);

    #[async_trait]
    impl DirectoryPicker for FixedPicker {
        async fn pick_directory(&self) -> Option<Utf8PathBuf> {
            self.0.clone()
        }
    }

    fn music_scanner() -> ScriptedScanner {
        ScriptedScanner::default()
            .with_tree("/music", &["/music/a.mp3", "/music/b.mp3", "/music/c.flac"])
            .with_tree("/music/rock", &["/music/rock/x.mp3"])
    }

    fn store_with(scanner: ScriptedScanner) -> Store {
        Store::builder(Arc::new(scanner)).build()
    }

    fn persisted(storage: &MemoryStore) -> PersistedState {
        let blob = storage.get(STATE_KEY).unwrap().unwrap();
        PersistedState::from_blob(&blob)
    }

    fn paths(files: &[AudioFile]) -> Vec<&str> {
        files.iter().map(|file| file.path.as_str()).collect()
    }

    // ========================================================================
    // Directories
    // ========================================================================

    #[tokio::test]
    async fn test_add_directory_scans_files() {
        let store = store_with(music_scanner());

        let summary = store.add_directory(Some(dir("/music/"))).await.unwrap().unwrap();
        assert_eq!(summary.files, 3);
        assert_eq!(summary.directory, dir("/music"));
        assert!(!summary.stale);

        let entry = store.directory(Utf8Path::new("/music")).unwrap();
        assert!(!entry.is_scanning());
        assert_eq!(entry.files().len(), 3);
        assert_eq!(
            paths(&store.visible_files()),
            ["/music/a.mp3", "/music/b.mp3", "/music/c.flac"]
        );

        let notifications = store.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert!(!notifications[0].is_error());
    }

    #[tokio::test]
    async fn test_rejected_scan() {
        let store = store_with(music_scanner());
        store.add_directory(Some(dir("/music/rock"))).await.unwrap();
        let _ = store.take_notifications();

        let error = store.add_directory(Some(dir("/missing"))).await.unwrap_err();
        assert!(matches!(error, StoreError::Scan(ScanError::NotFound(_))));

        let entry = store.directory(Utf8Path::new("/missing")).unwrap();
        assert!(!entry.is_scanning());
        assert!(entry.files().is_empty());
        assert_eq!(paths(&store.visible_files()), ["/music/rock/x.mp3"]);

        let notifications = store.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].is_error());
    }

    #[tokio::test]
    async fn test_per_file_failures_are_counted() {
        let scanner =
            ScriptedScanner::default().with_tree("/music", &["/music/a.mp3", "/music/b.bad"]);
        let store = store_with(scanner);

        let summary = store.add_directory(Some(dir("/music"))).await.unwrap().unwrap();
        assert_eq!((summary.files, summary.failures), (1, 1));
        assert!(store.audio_file(Utf8Path::new("/music/b.bad")).is_none());
    }

    #[tokio::test]
    async fn test_add_without_path_uses_picker() {
        let store = store_with(music_scanner());
        assert!(store.add_directory(None).await.unwrap().is_none());
        assert!(store.directories().is_empty());

        let cancelled = Store::builder(Arc::new(music_scanner()))
            .picker(Arc::new(FixedPicker(None)))
            .build();
        assert!(cancelled.add_directory(None).await.unwrap().is_none());
        assert!(cancelled.directories().is_empty());

        let picking = Store::builder(Arc::new(music_scanner()))
            .picker(Arc::new(FixedPicker(Some(dir("/music/rock")))))
            .build();
        let summary = picking.add_directory(None).await.unwrap().unwrap();
        assert_eq!(summary.directory, dir("/music/rock"));
    }

    #[tokio::test]
    async fn test_nested_removal() {
        let store = store_with(music_scanner());
        store.add_directory(Some(dir("/music"))).await.unwrap();
        store.add_directory(Some(dir("/music/rock"))).await.unwrap();

        assert_eq!(store.remove_directory(Utf8Path::new("/music")), Some(3));
        assert_eq!(paths(&store.visible_files()), ["/music/rock/x.mp3"]);
        assert!(store.audio_file(Utf8Path::new("/music/a.mp3")).is_none());
        assert_eq!(store.remove_directory(Utf8Path::new("/music")), None);
    }

    #[tokio::test]
    async fn test_results_after_removal_are_dropped() {
        let (handoff, mut senders) = mpsc::unbounded_channel();
        let store = Store::builder(Arc::new(ManualScanner { handoff })).build();

        let add = store.add_directory(Some(dir("/music")));
        let drive = async {
            let sender = senders.recv().await.unwrap();
            assert_eq!(store.remove_directory(Utf8Path::new("/music")), Some(0));
            sender.send(scanned("/music/late.mp3")).await.unwrap();
            sender.send(ScanEvent::Finished).await.unwrap();
        };
        let (result, ()) = tokio::join!(add, drive);

        let summary = result.unwrap().unwrap();
        assert!(summary.stale);
        assert_eq!(summary.files, 0);
        assert!(store.directories().is_empty());
        assert!(store.audio_file(Utf8Path::new("/music/late.mp3")).is_none());
    }

    #[tokio::test]
    async fn test_closed_stream_clears_scanning() {
        let (handoff, mut senders) = mpsc::unbounded_channel();
        let store = Store::builder(Arc::new(ManualScanner { handoff })).build();

        let add = store.add_directory(Some(dir("/music")));
        let drive = async {
            let sender = senders.recv().await.unwrap();
            sender.send(scanned("/music/a.mp3")).await.unwrap();
            drop(sender);
        };
        let (result, ()) = tokio::join!(add, drive);

        assert_eq!(result.unwrap().unwrap().files, 1);
        assert!(!store.directory(Utf8Path::new("/music")).unwrap().is_scanning());
    }

    #[tokio::test]
    async fn test_rescan_all_collects_every_outcome() {
        let store = store_with(music_scanner());
        store.add_directory(Some(dir("/music/rock"))).await.unwrap();
        store.add_directory(Some(dir("/gone"))).await.unwrap_err();

        let results = store.rescan_all().await;
        assert_eq!(results.len(), 2);
        let (failed, ok): (Vec<_>, Vec<_>) =
            results.iter().partition(|(_, result)| result.is_err());
        assert_eq!(failed[0].0, dir("/gone"));
        assert_eq!(ok[0].0, dir("/music/rock"));
        assert_eq!(store.directories().len(), 2);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    #[tokio::test]
    async fn test_directories_and_preferences_are_persisted() {
        let storage = Arc::new(MemoryStore::new());
        let store = Store::builder(Arc::new(music_scanner()))
            .storage(Arc::clone(&storage) as Arc<dyn KeyValueStore>)
            .build();

        store.add_directory(Some(dir("/music"))).await.unwrap();
        store.update_preferences(|preferences| {
            preferences.theme = Theme::Dark;
            preferences.set_filter_field(TagField::Genre, false);
        });

        let state = persisted(&storage);
        assert_eq!(state.directories, [dir("/music")]);
        assert_eq!(state.preferences.theme, Theme::Dark);
        assert!(!state.preferences.enabled_filter_fields().any(|f| f == TagField::Genre));

        store.remove_directory(Utf8Path::new("/music"));
        assert!(persisted(&storage).directories.is_empty());
    }

    #[tokio::test]
    async fn test_restore_rescans_persisted_directories() {
        let blob =
            r#"{"theme":"light","volume":0.5,"directories":["/music","/missing","/music/./"]}"#;
        let storage = Arc::new(MemoryStore::with_slot(STATE_KEY, blob));
        let store = Store::builder(Arc::new(music_scanner()))
            .storage(Arc::clone(&storage) as Arc<dyn KeyValueStore>)
            .build();

        let results = store.restore().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|(_, result)| result.is_ok()).count(), 1);

        let preferences = store.preferences();
        assert_eq!(preferences.theme, Theme::Light);
        assert!((preferences.volume - 0.5).abs() < f64::EPSILON);
        assert_eq!(store.visible_files().len(), 3);
        assert_eq!(persisted(&storage).directories, [dir("/missing"), dir("/music")]);
    }

    #[tokio::test]
    async fn test_restore_with_empty_storage() {
        let store = store_with(music_scanner());
        assert!(store.restore().await.is_empty());
        assert_eq!(store.preferences(), Preferences::default());
    }

    // ========================================================================
    // Editing
    // ========================================================================

    fn embedded() -> Picture {
        Picture::new(MimeType::Jpeg, vec![0xFF, 0xD8])
    }

    async fn editing_store(tags: &Arc<RecordingTags>) -> Store {
        let store = Store::builder(Arc::new(music_scanner()))
            .tag_backend(Arc::clone(tags) as Arc<dyn TagBackend>)
            .build();
        store.add_directory(Some(dir("/music"))).await.unwrap();
        store.select_file(Some(dir("/music/a.mp3")));
        let _ = store.take_notifications();
        store
    }

    #[tokio::test]
    async fn test_commit_edit_updates_registry() {
        let tags = Arc::new(RecordingTags::default());
        let store = editing_store(&tags).await;

        let mut form = store.selection().snapshot().unwrap().clone();
        form.title = Some("Renamed".to_owned());
        assert!(store.is_dirty(&form));

        store.commit_edit(form.clone(), false).await.unwrap();
        assert_eq!(tags.saved.lock().len(), 1);
        let saved = store.audio_file(Utf8Path::new("/music/a.mp3")).unwrap();
        assert_eq!(saved.title.as_deref(), Some("Renamed"));
        assert!(!store.is_dirty(&form));
    }

    #[tokio::test]
    async fn test_commit_selected_removes_cover() {
        let tags = Arc::new(RecordingTags {
            cover: Some(embedded()),
            ..RecordingTags::default()
        });
        let store = editing_store(&tags).await;
        store.stage_cover_from_audio(Utf8Path::new("/music/b.mp3")).await.unwrap();
        store.commit_selected(store.selection().snapshot().unwrap().clone()).await.unwrap();
        assert_eq!(
            store.audio_file(Utf8Path::new("/music/a.mp3")).unwrap().cover,
            Some(Cover::Embedded(embedded()))
        );

        store.stage_cover(StagedCover::Removed).unwrap();
        let form = store.selection().snapshot().unwrap().clone();
        store.commit_selected(form).await.unwrap();

        let request = tags.saved.lock().last().cloned().unwrap();
        assert!(request.remove_cover);
        assert!(request.cover.is_none());
        assert!(store.audio_file(Utf8Path::new("/music/a.mp3")).unwrap().cover.is_none());
        assert!(store.selection().staged_cover().is_unchanged());
    }

    #[tokio::test]
    async fn test_failed_save_changes_nothing() {
        let tags = Arc::new(RecordingTags {
            reject: true,
            ..RecordingTags::default()
        });
        let store = editing_store(&tags).await;
        store.stage_cover(StagedCover::Removed).unwrap();

        let mut form = store.selection().snapshot().unwrap().clone();
        form.title = Some("Unsaved".to_owned());
        let error = store.commit_edit(form.clone(), true).await.unwrap_err();
        assert!(matches!(error, StoreError::Tag(TagError::Rejected { .. })));

        assert!(store.audio_file(Utf8Path::new("/music/a.mp3")).unwrap().title.is_none());
        assert_eq!(store.selection().staged_cover(), &StagedCover::Removed);
        assert!(store.is_dirty(&form));
        assert!(store.take_notifications()[0].is_error());
    }

    #[tokio::test]
    async fn test_cover_extraction_failure() {
        let tags = Arc::new(RecordingTags::default());
        let store = editing_store(&tags).await;

        let error = store
            .stage_cover_from_audio(Utf8Path::new("/music/b.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::Tag(TagError::NoCover(_))));
        assert!(store.selection().staged_cover().is_unchanged());
    }

    /// Holds `extract_cover` open until the test releases it.
    #[derive(Default)]
    struct GatedTags {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl TagBackend for GatedTags {
        async fn save(&self, _request: SaveRequest) -> Result<(), TagError> {
            Ok(())
        }

        async fn extract_cover(&self, _audio_path: &Utf8Path) -> Result<Picture, TagError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(embedded())
        }
    }

    #[tokio::test]
    async fn test_extracted_cover_dropped_after_selection_change() {
        let tags = Arc::new(GatedTags::default());
        let store = Store::builder(Arc::new(music_scanner()))
            .tag_backend(Arc::clone(&tags) as Arc<dyn TagBackend>)
            .build();
        store.add_directory(Some(dir("/music"))).await.unwrap();
        store.select_file(Some(dir("/music/a.mp3")));

        let (result, ()) = tokio::join!(
            store.stage_cover_from_audio(Utf8Path::new("/x/other.mp3")),
            async {
                tags.started.notified().await;
                store.select_file(Some(dir("/music/b.mp3")));
                tags.release.notify_one();
            }
        );

        result.unwrap();
        assert_eq!(store.selection().path(), Some(Utf8Path::new("/music/b.mp3")));
        assert!(store.selection().staged_cover().is_unchanged());
    }

    #[tokio::test]
    async fn test_commit_without_tag_backend() {
        let store = store_with(music_scanner());
        let error = store.commit_edit(AudioFile::new("/music/a.mp3"), false).await.unwrap_err();
        assert!(matches!(error, StoreError::NoTagBackend));
    }

    // ========================================================================
    // Drag and drop, queries
    // ========================================================================

    #[tokio::test]
    async fn test_drop_handles_each_path_independently() {
        let store = Store::builder(Arc::new(music_scanner()))
            .file_system(Arc::new(FakeFileSystem {
                directories: vec![dir("/music"), dir("/missing")],
            }))
            .build();

        store.handle_drop(DropEvent::entered(["/music"])).await;
        assert!(store.overlay().visible);
        assert!(store.overlay().directory);

        let outcomes = store
            .handle_drop(DropEvent::dropped([
                "/music",
                "/song.mp3",
                "/nowhere",
                "/missing",
                "/music",
            ]))
            .await;
        assert_eq!(outcomes.len(), 4);
        assert!(matches!(outcomes[0].result, Ok(DropAction::Scanned(_))));
        assert!(matches!(outcomes[1].result, Ok(DropAction::SkippedFile)));
        assert!(matches!(outcomes[2].result, Err(StoreError::Drop(_))));
        assert!(matches!(outcomes[3].result, Err(StoreError::Scan(_))));

        assert!(!store.overlay().visible);
        assert_eq!(store.visible_files().len(), 3);
        let errors = store.take_notifications().iter().filter(|n| n.is_error()).count();
        assert_eq!(errors, 2);
    }

    #[tokio::test]
    async fn test_query_uses_preferences() {
        let store = store_with(music_scanner());
        store.add_directory(Some(dir("/music"))).await.unwrap();
        for (path, title) in [("/music/a.mp3", "Moonlight"), ("/music/b.mp3", "Blue Moon")] {
            let mut file = AudioFile::new(path);
            file.title = Some(title.to_owned());
            store.inner.state.lock().set_audio_file(Utf8Path::new(path), Some(file));
        }

        assert_eq!(paths(&store.query("moon")), ["/music/a.mp3", "/music/b.mp3"]);
        assert_eq!(paths(&store.query("Blue")), ["/music/b.mp3"]);
        assert_eq!(store.query("").len(), 3);

        store.update_preferences(|preferences| {
            preferences.set_filter_field(TagField::Title, false);
        });
        assert!(store.query("moon").is_empty());
    }
}
