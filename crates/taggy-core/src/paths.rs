//! Directory path normalization and containment.
//!
//! Tracked directories are compared component by component: `/music/rock`
//! contains `/music/rock/a.mp3` but not `/music/rockabilly/a.mp3`.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Normalizes a path lexically: `.` components and trailing separators are
/// dropped. The filesystem is not consulted, so `..` and symlinks are kept.
///
/// # Examples
///
/// ```
/// use taggy_core::normalize_path;
/// use camino::Utf8Path;
///
/// assert_eq!(normalize_path(Utf8Path::new("/music/./rock/")), "/music/rock");
/// ```
#[must_use]
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .map(|component| component.as_str())
        .collect()
}

/// Returns `true` if `path` is `dir` or lies beneath it.
///
/// # Examples
///
/// ```
/// use taggy_core::is_within;
/// use camino::Utf8Path;
///
/// assert!(is_within(Utf8Path::new("/music/rock/a.mp3"), Utf8Path::new("/music/rock")));
/// assert!(!is_within(Utf8Path::new("/music/rockabilly/a.mp3"), Utf8Path::new("/music/rock")));
/// ```
#[must_use]
pub fn is_within(path: &Utf8Path, dir: &Utf8Path) -> bool {
    path.starts_with(dir)
}
