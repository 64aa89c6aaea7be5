//! The selected file and its pending edit session.

use camino::{Utf8Path, Utf8PathBuf};
use taggy_core::{AudioFile, StagedCover};

/// Which file the editor shows, the registry record it was loaded from, and
/// any cover change staged but not yet saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    path: Option<Utf8PathBuf>,
    snapshot: Option<AudioFile>,
    staged_cover: StagedCover,
}

impl Selection {
    /// The selected path.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// The registry record of the selected path at the last refresh.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&AudioFile> {
        self.snapshot.as_ref()
    }

    /// The pending cover change.
    #[must_use]
    pub const fn staged_cover(&self) -> &StagedCover {
        &self.staged_cover
    }

    /// Returns `true` if `path` is the selected file.
    #[must_use]
    pub fn is_selected(&self, path: &Utf8Path) -> bool {
        self.path.as_deref() == Some(path)
    }

    /// Returns `true` when the working `form` differs from the snapshot or a
    /// cover change is staged.
    ///
    /// # Examples
    ///
    /// ```
    /// use taggy_store::Selection;
    /// use taggy_core::AudioFile;
    ///
    /// let selection = Selection::default();
    /// assert!(selection.is_dirty(&AudioFile::new("/a.mp3")));
    /// ```
    #[must_use]
    pub fn is_dirty(&self, form: &AudioFile) -> bool {
        !self.staged_cover.is_unchanged() || self.snapshot.as_ref() != Some(form)
    }

    pub(crate) fn select(&mut self, path: Option<Utf8PathBuf>, snapshot: Option<AudioFile>) {
        self.path = path;
        self.snapshot = snapshot;
        self.staged_cover = StagedCover::Unchanged;
    }

    pub(crate) fn clear(&mut self) {
        self.select(None, None);
    }

    pub(crate) fn refresh(&mut self, snapshot: AudioFile) {
        self.snapshot = Some(snapshot);
    }

    pub(crate) fn stage_cover(&mut self, staged: StagedCover) {
        self.staged_cover = staged;
    }
}

#[cfg(test)]
mod tests {
    use taggy_core::CoverData;

    use super::*;

    #[test]
    fn test_select_resets_staged_cover() {
        let mut selection = Selection::default();
        selection.select(Some("/a.mp3".into()), Some(AudioFile::new("/a.mp3")));
        selection.stage_cover(StagedCover::Removed);

        selection.select(Some("/b.mp3".into()), None);
        assert_eq!(selection.staged_cover(), &StagedCover::Unchanged);
        assert!(selection.is_selected(Utf8Path::new("/b.mp3")));
        assert!(selection.snapshot().is_none());
    }

    #[test]
    fn test_dirty_tracks_form_and_staged_cover() {
        let snapshot = AudioFile::new("/a.mp3");
        let mut selection = Selection::default();
        selection.select(Some("/a.mp3".into()), Some(snapshot.clone()));
        assert!(!selection.is_dirty(&snapshot));

        let mut edited = snapshot.clone();
        edited.title = Some("Changed".to_owned());
        assert!(selection.is_dirty(&edited));

        selection.stage_cover(StagedCover::Replaced(CoverData::ImageFile("/art.png".into())));
        assert!(selection.is_dirty(&snapshot));

        selection.stage_cover(StagedCover::Unchanged);
        assert!(!selection.is_dirty(&snapshot));
    }

    #[test]
    fn test_clear() {
        let mut selection = Selection::default();
        selection.select(Some("/a.mp3".into()), Some(AudioFile::new("/a.mp3")));
        selection.clear();
        assert_eq!(selection, Selection::default());
    }
}
