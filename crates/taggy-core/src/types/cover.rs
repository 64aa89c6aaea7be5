//! Cover art types.
//!
//! Three shapes of cover data move through the application:
//!
//! - [`Picture`]: raw image bytes plus MIME type, as decoded by the backend.
//! - [`Cover`]: what a committed [`AudioFile`](super::AudioFile) holds, a
//!   displayable reference to either embedded bytes or an image on disk.
//! - [`CoverData`] / [`StagedCover`]: a pending, unsaved change held by the
//!   edit session alongside the committed record.

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Image formats a cover can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/bmp`
    Bmp,
    /// `image/gif`
    Gif,
    /// `image/tiff`
    Tiff,
}

impl MimeType {
    /// Guesses the MIME type from a file extension.
    ///
    /// Unknown or missing extensions fall back to JPEG, the format tag
    /// writers assume when none is declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use taggy_core::MimeType;
    /// use camino::Utf8Path;
    ///
    /// assert_eq!(MimeType::from_path(Utf8Path::new("cover.PNG")), MimeType::Png);
    /// assert_eq!(MimeType::from_path(Utf8Path::new("folder.webp")), MimeType::Jpeg);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("png") => Self::Png,
            Some("bmp") => Self::Bmp,
            Some("gif") => Self::Gif,
            Some("tif" | "tiff") => Self::Tiff,
            _ => Self::Jpeg,
        }
    }

    /// Returns the IANA media type string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded image bytes.
///
/// The bytes are shared, so cloning a picture (and every record holding
/// one) does not copy the image.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    /// Format of `data`.
    pub mime_type: MimeType,
    /// Raw image bytes.
    pub data: Arc<[u8]>,
}

impl Picture {
    /// Creates a picture from owned bytes.
    #[must_use]
    pub fn new(mime_type: MimeType, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type,
            data: data.into(),
        }
    }

    /// Returns the size of the image in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the picture carries no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Picture")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A displayable cover reference stored on a committed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Cover {
    /// Artwork embedded in the audio file.
    Embedded(Picture),
    /// An image file on disk.
    File(Utf8PathBuf),
}

/// A new cover chosen by the user but not yet written to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverData {
    /// An image file picked from disk.
    ImageFile(Utf8PathBuf),
    /// Artwork the backend extracted from another audio file.
    Embedded {
        /// The audio file the artwork came from.
        source: Utf8PathBuf,
        /// The extracted artwork.
        picture: Picture,
    },
}

impl CoverData {
    /// Returns the reference a record shows once this cover has been saved.
    ///
    /// # Examples
    ///
    /// ```
    /// use taggy_core::{Cover, CoverData};
    /// use camino::Utf8PathBuf;
    ///
    /// let staged = CoverData::ImageFile(Utf8PathBuf::from("/art/front.jpg"));
    /// assert_eq!(staged.display(), Cover::File(Utf8PathBuf::from("/art/front.jpg")));
    /// ```
    #[must_use]
    pub fn display(&self) -> Cover {
        match self {
            Self::ImageFile(path) => Cover::File(path.clone()),
            Self::Embedded { picture, .. } => Cover::Embedded(picture.clone()),
        }
    }
}

/// The pending cover change of an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StagedCover {
    /// No pending change.
    #[default]
    Unchanged,
    /// The existing cover will be removed on save.
    Removed,
    /// The cover will be replaced on save.
    Replaced(CoverData),
}

impl StagedCover {
    /// Returns `true` if there is no pending change.
    #[inline]
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Returns the replacement payload, if any.
    #[must_use]
    pub const fn replacement(&self) -> Option<&CoverData> {
        match self {
            Self::Replaced(data) => Some(data),
            Self::Unchanged | Self::Removed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_path() {
        assert_eq!(MimeType::from_path(Utf8Path::new("a.jpg")), MimeType::Jpeg);
        assert_eq!(MimeType::from_path(Utf8Path::new("a.gif")), MimeType::Gif);
        assert_eq!(MimeType::from_path(Utf8Path::new("a.tif")), MimeType::Tiff);
        assert_eq!(MimeType::from_path(Utf8Path::new("a.Bmp")), MimeType::Bmp);
        assert_eq!(MimeType::from_path(Utf8Path::new("noext")), MimeType::Jpeg);
        assert_eq!(MimeType::Png.to_string(), "image/png");
    }

    #[test]
    fn test_picture_clone_shares_bytes() {
        let picture = Picture::new(MimeType::Png, vec![1_u8, 2, 3]);
        let copy = picture.clone();
        assert!(Arc::ptr_eq(&picture.data, &copy.data));
        assert_eq!(copy.len(), 3);
        assert!(!copy.is_empty());
        assert_eq!(format!("{picture:?}"), "Picture { mime_type: Png, len: 3 }");
    }

    #[test]
    fn test_embedded_display() {
        let picture = Picture::new(MimeType::Jpeg, vec![0xFF_u8, 0xD8]);
        let staged = CoverData::Embedded {
            source: Utf8PathBuf::from("/music/other.flac"),
            picture: picture.clone(),
        };
        assert_eq!(staged.display(), Cover::Embedded(picture));
    }

    #[test]
    fn test_staged_cover_states() {
        assert!(StagedCover::default().is_unchanged());
        assert!(!StagedCover::Removed.is_unchanged());
        assert!(StagedCover::Removed.replacement().is_none());

        let data = CoverData::ImageFile(Utf8PathBuf::from("/art/a.png"));
        let staged = StagedCover::Replaced(data.clone());
        assert_eq!(staged.replacement(), Some(&data));
    }

    #[test]
    fn test_cover_serde_shape() {
        let cover = Cover::File(Utf8PathBuf::from("/art/a.png"));
        let json = serde_json::to_value(&cover).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "file", "value": "/art/a.png" }));
    }
}
