//! The audio file record and the save request built from it.

use std::borrow::Cow;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::cover::{Cover, CoverData};
use super::field::TagField;
use super::timestamp::Timestamp;

/// File extensions (lowercase) the application treats as audio files.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "mp4", "m4a"];

/// Returns `true` if the path has one of the [`AUDIO_EXTENSIONS`],
/// compared case-insensitively.
///
/// # Examples
///
/// ```
/// use taggy_core::is_audio_path;
/// use camino::Utf8Path;
///
/// assert!(is_audio_path(Utf8Path::new("/music/track.FLAC")));
/// assert!(!is_audio_path(Utf8Path::new("/music/cover.jpg")));
/// ```
#[must_use]
pub fn is_audio_path(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Tag metadata for one audio file, keyed by its absolute path.
///
/// Every tag is optional: a freshly discovered file with no readable tags
/// is represented by [`AudioFile::new`].
///
/// # Examples
///
/// ```
/// use taggy_core::{AudioFile, TagField};
///
/// let mut file = AudioFile::new("/music/a.mp3");
/// file.title = Some("Intro".to_owned());
/// file.track_number = Some(1);
///
/// assert_eq!(file.text(TagField::Title).as_deref(), Some("Intro"));
/// assert_eq!(file.text(TagField::TrackNumber).as_deref(), Some("1"));
/// assert_eq!(file.file_name(), Some("a.mp3"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    /// Absolute path of the file. Never changes for a given record.
    pub path: Utf8PathBuf,

    /// Track title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Track artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    /// Album title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_title: Option<String>,

    /// Album artists, in tag order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_artists: Option<SmallVec<[String; 2]>>,

    /// Genre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// Composer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,

    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Recording date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,

    /// Position of the track on its disc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u16>,

    /// Number of tracks on the disc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tracks: Option<u16>,

    /// Disc number within the release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u16>,

    /// Number of discs in the release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_discs: Option<u16>,

    /// Displayable cover art.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
}

impl AudioFile {
    /// Creates a record with no tags for the given path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Returns the final path component.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }

    /// Returns the searchable text of a tag field, if the tag is set.
    ///
    /// Album artists are joined with `"; "`, the date contributes its year.
    #[must_use]
    pub fn text(&self, field: TagField) -> Option<Cow<'_, str>> {
        fn borrowed(value: &Option<String>) -> Option<Cow<'_, str>> {
            value.as_deref().map(Cow::Borrowed)
        }

        match field {
            TagField::Title => borrowed(&self.title),
            TagField::Artist => borrowed(&self.artist),
            TagField::AlbumTitle => borrowed(&self.album_title),
            TagField::AlbumArtist => self
                .album_artists
                .as_ref()
                .filter(|artists| !artists.is_empty())
                .map(|artists| Cow::Owned(artists.join("; "))),
            TagField::Genre => borrowed(&self.genre),
            TagField::Composer => borrowed(&self.composer),
            TagField::Comment => borrowed(&self.comment),
            TagField::Year => self.date.map(|date| Cow::Owned(date.year().to_string())),
            TagField::TrackNumber => self.track_number.map(|n| Cow::Owned(n.to_string())),
            TagField::DiscNumber => self.disc_number.map(|n| Cow::Owned(n.to_string())),
        }
    }
}

/// Everything the backend needs to write one file's tags.
///
/// `record.cover` is always cleared: the backend writes the cover from
/// `cover` (a new payload) or deletes it when `remove_cover` is set, and
/// otherwise leaves the embedded artwork untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// The tags to write.
    pub record: AudioFile,
    /// A replacement cover, if one was staged.
    pub cover: Option<CoverData>,
    /// Whether the existing cover is to be deleted.
    pub remove_cover: bool,
}

impl SaveRequest {
    /// Builds a save request, stripping the display cover from `record`.
    #[must_use]
    pub fn new(mut record: AudioFile, cover: Option<CoverData>, remove_cover: bool) -> Self {
        record.cover = None;
        Self {
            record,
            cover,
            remove_cover,
        }
    }

    /// Returns the path of the file being written.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.record.path
    }
}
