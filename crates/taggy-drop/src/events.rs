//! Drag-and-drop events delivered by the operating system.

use camino::Utf8PathBuf;
use smallvec::SmallVec;
use taggy_core::{FxHashSet, fx_hash_set_with_capacity};

/// Paths carried by a drag. Most drags carry a handful of entries.
pub type DropPaths = SmallVec<[Utf8PathBuf; 4]>;

/// One event of a drag gesture over the application window.
///
/// # Examples
///
/// ```
/// use taggy_drop::DropEvent;
///
/// let event = DropEvent::dropped(["/music/a", "/music/b", "/music/a"]);
/// assert_eq!(event.paths().len(), 3);
/// assert_eq!(event.unique_paths().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropEvent {
    /// A drag entered the window.
    Enter {
        /// The dragged paths.
        paths: DropPaths,
    },
    /// The drag moved over the window.
    Over,
    /// The paths were dropped.
    Drop {
        /// The dropped paths.
        paths: DropPaths,
    },
    /// The drag left the window or was cancelled.
    Leave,
}

impl DropEvent {
    /// Creates an [`DropEvent::Enter`] event.
    pub fn entered<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self::Enter {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a [`DropEvent::Drop`] event.
    pub fn dropped<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self::Drop {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the paths carried by this event.
    #[must_use]
    pub fn paths(&self) -> &[Utf8PathBuf] {
        match self {
            Self::Enter { paths } | Self::Drop { paths } => paths,
            Self::Over | Self::Leave => &[],
        }
    }

    /// Returns the distinct paths in first-seen order.
    #[must_use]
    pub fn unique_paths(&self) -> Vec<Utf8PathBuf> {
        let paths = self.paths();
        let mut seen: FxHashSet<&Utf8PathBuf> = fx_hash_set_with_capacity(paths.len());
        paths
            .iter()
            .filter(|path| seen.insert(*path))
            .cloned()
            .collect()
    }
}
