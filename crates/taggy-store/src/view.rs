//! The visible-file projection.

use std::collections::BTreeMap;

use camino::Utf8Path;
use taggy_core::AudioFile;

use crate::registry::Registry;
use crate::tracker::DirectoryTracker;

/// Projects the registry through the tracked directories.
///
/// For every tracked directory and every path in its file list, includes
/// the registry record for that path if there is one. Keying by path
/// collapses files listed under overlapping directories.
///
/// The projection is recomputed on each call, so it can never disagree
/// with the two maps it reads.
#[must_use]
pub fn derive_visible<'a>(
    registry: &'a Registry,
    tracker: &'a DirectoryTracker,
) -> BTreeMap<&'a Utf8Path, &'a AudioFile> {
    tracker
        .entries()
        .flat_map(|(_, entry)| entry.files())
        .filter_map(|path| registry.get(path).map(|file| (path.as_path(), file)))
        .collect()
}
