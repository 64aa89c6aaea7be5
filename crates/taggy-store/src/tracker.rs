//! Per-directory scan status and discovered files.
//!
//! Every scan is issued against a [`ScanTicket`] carrying the generation the
//! directory entry had when the scan started. Re-adding or removing the
//! directory moves it to a new generation (or drops it), so events still in
//! flight from the older scan no longer match and are discarded.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use taggy_core::is_within;

/// Monotonic scan counter shared by all directories of a tracker.
pub type Generation = u64;

/// Identifies one scan of one directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTicket {
    /// The directory being scanned.
    pub directory: Utf8PathBuf,
    /// The generation the scan was issued under.
    pub generation: Generation,
}

/// Bookkeeping for one tracked directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    scanning: bool,
    files: Vec<Utf8PathBuf>,
    generation: Generation,
}

impl DirectoryEntry {
    /// Returns `true` from scan request until its terminal signal or failure.
    #[inline]
    #[must_use]
    pub const fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Paths discovered by the current scan, in arrival order.
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    /// Generation of the scan that owns this entry.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }
}

/// The set of tracked directories, ordered by path.
///
/// # Examples
///
/// ```
/// use taggy_store::DirectoryTracker;
/// use camino::{Utf8Path, Utf8PathBuf};
///
/// let mut tracker = DirectoryTracker::new();
/// let ticket = tracker.begin_scan(Utf8PathBuf::from("/music"));
/// assert!(tracker.record_file(&ticket, Utf8PathBuf::from("/music/a.mp3")));
/// assert!(tracker.finish_scan(&ticket));
///
/// let entry = tracker.get(Utf8Path::new("/music")).unwrap();
/// assert!(!entry.is_scanning());
/// assert_eq!(entry.files().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectoryTracker {
    entries: BTreeMap<Utf8PathBuf, DirectoryEntry>,
    next_generation: Generation,
}

impl DirectoryTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)initializes the entry for `directory` as scanning with no files
    /// and returns the ticket for the new scan.
    pub fn begin_scan(&mut self, directory: Utf8PathBuf) -> ScanTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries.insert(
            directory.clone(),
            DirectoryEntry {
                scanning: true,
                files: Vec::new(),
                generation,
            },
        );
        ScanTicket {
            directory,
            generation,
        }
    }

    /// Returns `true` if `ticket` belongs to the directory's current scan.
    #[must_use]
    pub fn is_current(&self, ticket: &ScanTicket) -> bool {
        self.entries
            .get(&ticket.directory)
            .is_some_and(|entry| entry.generation == ticket.generation)
    }

    /// Appends a discovered path. Returns `false` (and changes nothing) for a
    /// stale ticket.
    pub fn record_file(&mut self, ticket: &ScanTicket, path: Utf8PathBuf) -> bool {
        match self.current_entry_mut(ticket) {
            Some(entry) => {
                entry.files.push(path);
                true
            }
            None => false,
        }
    }

    /// Marks the scan as no longer running. Returns `false` for a stale
    /// ticket.
    pub fn finish_scan(&mut self, ticket: &ScanTicket) -> bool {
        match self.current_entry_mut(ticket) {
            Some(entry) => {
                entry.scanning = false;
                true
            }
            None => false,
        }
    }

    /// Stops tracking `directory`, returning its entry if it was tracked.
    pub fn remove(&mut self, directory: &Utf8Path) -> Option<DirectoryEntry> {
        self.entries.remove(directory)
    }

    /// Returns the entry for `directory`.
    #[must_use]
    pub fn get(&self, directory: &Utf8Path) -> Option<&DirectoryEntry> {
        self.entries.get(directory)
    }

    /// Returns `true` if `directory` is tracked.
    #[must_use]
    pub fn contains(&self, directory: &Utf8Path) -> bool {
        self.entries.contains_key(directory)
    }

    /// Returns `true` if some tracked directory is or contains `path`.
    #[must_use]
    pub fn covers(&self, path: &Utf8Path) -> bool {
        self.entries.keys().any(|dir| is_within(path, dir))
    }

    /// Iterates over the tracked directories in path order.
    pub fn directories(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.entries.keys()
    }

    /// Iterates over the tracked directories and their entries.
    pub fn entries(&self) -> impl Iterator<Item = (&Utf8PathBuf, &DirectoryEntry)> {
        self.entries.iter()
    }

    /// Returns the number of tracked directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no directory is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current_entry_mut(&mut self, ticket: &ScanTicket) -> Option<&mut DirectoryEntry> {
        self.entries
            .get_mut(&ticket.directory)
            .filter(|entry| entry.generation == ticket.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(path: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(path)
    }

    #[test]
    fn test_begin_scan_resets_entry() {
        let mut tracker = DirectoryTracker::new();
        let first = tracker.begin_scan(dir("/music"));
        tracker.record_file(&first, dir("/music/a.mp3"));
        tracker.finish_scan(&first);

        let second = tracker.begin_scan(dir("/music"));
        let entry = tracker.get(Utf8Path::new("/music")).unwrap();
        assert!(entry.is_scanning());
        assert!(entry.files().is_empty());
        assert!(second.generation > first.generation);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_stale_ticket_after_rescan_is_ignored() {
        let mut tracker = DirectoryTracker::new();
        let old = tracker.begin_scan(dir("/music"));
        let new = tracker.begin_scan(dir("/music"));

        assert!(!tracker.is_current(&old));
        assert!(!tracker.record_file(&old, dir("/music/late.mp3")));
        assert!(!tracker.finish_scan(&old));

        let entry = tracker.get(Utf8Path::new("/music")).unwrap();
        assert!(entry.files().is_empty());
        assert!(entry.is_scanning());
        assert!(tracker.is_current(&new));
    }

    #[test]
    fn test_stale_ticket_after_removal_does_not_recreate_entry() {
        let mut tracker = DirectoryTracker::new();
        let ticket = tracker.begin_scan(dir("/music"));
        assert!(tracker.remove(Utf8Path::new("/music")).is_some());

        assert!(!tracker.record_file(&ticket, dir("/music/a.mp3")));
        assert!(!tracker.finish_scan(&ticket));
        assert!(!tracker.contains(Utf8Path::new("/music")));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_files_keep_arrival_order() {
        let mut tracker = DirectoryTracker::new();
        let ticket = tracker.begin_scan(dir("/music"));
        for name in ["c.flac", "a.mp3", "b.mp3"] {
            tracker.record_file(&ticket, dir("/music").join(name));
        }
        let files: Vec<&str> = tracker
            .get(Utf8Path::new("/music"))
            .unwrap()
            .files()
            .iter()
            .map(|p| p.as_str())
            .collect();
        assert_eq!(files, ["/music/c.flac", "/music/a.mp3", "/music/b.mp3"]);
    }

    #[test]
    fn test_covers_and_ordering() {
        let mut tracker = DirectoryTracker::new();
        tracker.begin_scan(dir("/music/rock"));
        tracker.begin_scan(dir("/books"));

        assert!(tracker.covers(Utf8Path::new("/music/rock/a.mp3")));
        assert!(!tracker.covers(Utf8Path::new("/music/rockabilly/a.mp3")));
        let dirs: Vec<&str> = tracker.directories().map(|d| d.as_str()).collect();
        assert_eq!(dirs, ["/books", "/music/rock"]);
        assert_eq!(tracker.entries().count(), 2);
    }
}
