//! The path-keyed map of every known audio file.
//!
//! [`Registry`] is plain data: it neither knows about directories nor about
//! the selection. [`LibraryState`](crate::LibraryState) is its only writer
//! and keeps the selection in step with every mutation.

use camino::{Utf8Path, Utf8PathBuf};
use taggy_core::{AudioFile, FxHashMap, fx_hash_map, is_within};

/// Map from absolute path to the decoded [`AudioFile`].
///
/// # Examples
///
/// ```
/// use taggy_store::Registry;
/// use taggy_core::AudioFile;
/// use camino::Utf8Path;
///
/// let mut registry = Registry::new();
/// registry.insert(AudioFile::new("/music/a.mp3"));
/// assert!(registry.contains(Utf8Path::new("/music/a.mp3")));
///
/// registry.remove(Utf8Path::new("/music/a.mp3"));
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    files: FxHashMap<Utf8PathBuf, AudioFile>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: fx_hash_map(),
        }
    }

    /// Returns the record for `path`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<&AudioFile> {
        self.files.get(path)
    }

    /// Returns `true` if `path` has a record.
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(path)
    }

    /// Inserts or overwrites the record stored under `file.path`, returning
    /// the previous one.
    pub fn insert(&mut self, file: AudioFile) -> Option<AudioFile> {
        self.files.insert(file.path.clone(), file)
    }

    /// Removes the record for `path`, returning it.
    pub fn remove(&mut self, path: &Utf8Path) -> Option<AudioFile> {
        self.files.remove(path)
    }

    /// Returns the paths at or beneath `dir`, sorted.
    #[must_use]
    pub fn paths_within(&self, dir: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut paths: Vec<Utf8PathBuf> = self
            .files
            .keys()
            .filter(|path| is_within(path, dir))
            .cloned()
            .collect();
        paths.sort_unstable();
        paths
    }

    /// Returns the number of records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if there are no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over all records in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &AudioFile> {
        self.files.values()
    }
}
