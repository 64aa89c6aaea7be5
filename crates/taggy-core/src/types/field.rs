//! Tag fields addressable by search filters and sort criteria.

use serde::{Deserialize, Serialize};

/// A searchable tag of an [`AudioFile`](super::AudioFile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagField {
    /// Track title.
    Title,
    /// Track artist.
    Artist,
    /// Album title.
    AlbumTitle,
    /// Album artists.
    AlbumArtist,
    /// Genre.
    Genre,
    /// Composer.
    Composer,
    /// Comment.
    Comment,
    /// Year of the recording date.
    Year,
    /// Track number.
    TrackNumber,
    /// Disc number.
    DiscNumber,
}

impl TagField {
    /// Every field, in display order.
    pub const ALL: [Self; 10] = [
        Self::Title,
        Self::Artist,
        Self::AlbumTitle,
        Self::AlbumArtist,
        Self::Genre,
        Self::Composer,
        Self::Comment,
        Self::Year,
        Self::TrackNumber,
        Self::DiscNumber,
    ];

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Artist => "Artist",
            Self::AlbumTitle => "Album",
            Self::AlbumArtist => "Album Artist",
            Self::Genre => "Genre",
            Self::Composer => "Composer",
            Self::Comment => "Comment",
            Self::Year => "Year",
            Self::TrackNumber => "Track",
            Self::DiscNumber => "Disc",
        }
    }

    /// Returns the key used in persisted preferences.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::AlbumTitle => "albumTitle",
            Self::AlbumArtist => "albumArtist",
            Self::Genre => "genre",
            Self::Composer => "composer",
            Self::Comment => "comment",
            Self::Year => "year",
            Self::TrackNumber => "trackNumber",
            Self::DiscNumber => "discNumber",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches_serde_name() {
        for field in TagField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(TagField::AlbumTitle.label(), "Album");
        assert_eq!(TagField::AlbumArtist.label(), "Album Artist");
    }
}
