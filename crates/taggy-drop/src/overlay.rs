//! State of the drop overlay shown while a drag hovers over the window.

use taggy_core::is_audio_path;

use crate::events::DropEvent;

/// Whether the drop overlay is showing, and what it announces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragOverlay {
    /// The overlay is visible.
    pub visible: bool,
    /// The drag looks like it carries directories rather than audio files.
    pub directory: bool,
}

impl DragOverlay {
    /// Updates the overlay for an event.
    ///
    /// Returns the deduplicated paths to ingest when the event is a drop.
    ///
    /// # Examples
    ///
    /// ```
    /// use taggy_drop::{DragOverlay, DropEvent};
    ///
    /// let mut overlay = DragOverlay::default();
    /// assert!(overlay.apply(&DropEvent::entered(["/music/albums"])).is_none());
    /// assert!(overlay.visible && overlay.directory);
    ///
    /// let dropped = overlay.apply(&DropEvent::dropped(["/music/albums"]));
    /// assert_eq!(dropped.map(|p| p.len()), Some(1));
    /// assert!(!overlay.visible);
    /// ```
    pub fn apply(&mut self, event: &DropEvent) -> Option<Vec<camino::Utf8PathBuf>> {
        match event {
            DropEvent::Enter { paths } => {
                self.visible = true;
                self.directory =
                    !paths.is_empty() && paths.iter().all(|path| !is_audio_path(path));
                None
            }
            DropEvent::Over => {
                self.visible = true;
                None
            }
            DropEvent::Leave => {
                *self = Self::default();
                None
            }
            DropEvent::Drop { .. } => {
                *self = Self::default();
                Some(event.unique_paths())
            }
        }
    }
}
