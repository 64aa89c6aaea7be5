//! User preferences and the persisted state blob.
//!
//! - [`Preferences`] - search, sort, playback and layout settings
//! - [`PersistedState`] - preferences plus the tracked directory list, as
//!   stored in the `taggy.state` slot
//!
//! Loading is tolerant: each field of the stored blob is decoded on its own
//! and a missing or malformed field falls back to its default without
//! discarding the rest.

use camino::Utf8PathBuf;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::StorageError;
use crate::types::TagField;

/// Name of the key/value slot holding the [`PersistedState`].
pub const STATE_KEY: &str = "taggy.state";

/// Fields searched by default, all enabled.
const DEFAULT_FILTER_FIELDS: [TagField; 6] = [
    TagField::Title,
    TagField::Artist,
    TagField::AlbumTitle,
    TagField::AlbumArtist,
    TagField::Genre,
    TagField::Year,
];

/// Colour theme of the application window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
    /// Follow the operating system.
    #[default]
    System,
}

/// A tag field the search can match against, and whether it is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterField {
    /// The tag searched.
    pub field: TagField,
    /// Whether the search considers this field.
    pub enabled: bool,
}

/// Sort direction of a criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// What a sort criterion orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Search relevance.
    Score,
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
    /// Recording date.
    Year,
    /// Track number.
    TrackNumber,
    /// Disc number.
    DiscNumber,
    /// File path.
    Path,
}

impl SortField {
    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Score => "Best Match",
            Self::Title => "Title",
            Self::Artist => "Artist",
            Self::AlbumTitle => "Album",
            Self::AlbumArtist => "Album Artist",
            Self::Genre => "Genre",
            Self::Year => "Year",
            Self::TrackNumber => "Track",
            Self::DiscNumber => "Disc",
            Self::Path => "Path",
        }
    }
}

/// One entry of the ordered sort criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// The key to order by.
    pub field: SortField,
    /// The direction to order in.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCriterion {
    /// Creates an ascending criterion.
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }
}

/// Sizes of the resizable panels, as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSizes {
    /// File list versus editor split.
    pub main: Vec<f64>,
    /// Tag form versus preview split inside the editor.
    pub editor: Vec<f64>,
}

impl Default for PanelSizes {
    fn default() -> Self {
        Self {
            main: vec![30.0, 70.0],
            editor: vec![60.0, 40.0],
        }
    }
}

/// User preferences.
///
/// # Examples
///
/// ```
/// use taggy_core::{Preferences, SortField};
///
/// let prefs = Preferences::default();
/// assert_eq!(prefs.sort_criteria[0].field, SortField::Score);
/// assert!((prefs.volume - 1.0).abs() < f64::EPSILON);
/// assert_eq!(prefs.enabled_filter_fields().count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Fields the search can match against.
    pub filter_fields: Vec<FilterField>,

    /// Ordered sort criteria; earlier criteria take precedence.
    pub sort_criteria: Vec<SortCriterion>,

    /// Playback volume in `0.0..=1.0`.
    pub volume: f64,

    /// Whether the editor shows the less common tag fields.
    pub show_extra_tag_fields: bool,

    /// Colour theme.
    pub theme: Theme,

    /// Resizable panel layout.
    pub panel_sizes: PanelSizes,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            filter_fields: DEFAULT_FILTER_FIELDS
                .iter()
                .map(|&field| FilterField { field, enabled: true })
                .collect(),
            sort_criteria: vec![
                SortCriterion::asc(SortField::Score),
                SortCriterion::asc(SortField::Title),
            ],
            volume: 1.0,
            show_extra_tag_fields: false,
            theme: Theme::System,
            panel_sizes: PanelSizes::default(),
        }
    }
}

impl Preferences {
    /// Iterates over the fields the search currently uses.
    pub fn enabled_filter_fields(&self) -> impl Iterator<Item = TagField> + '_ {
        self.filter_fields
            .iter()
            .filter(|f| f.enabled)
            .map(|f| f.field)
    }

    /// Enables or disables a filter field, adding it if unknown.
    pub fn set_filter_field(&mut self, field: TagField, enabled: bool) {
        match self.filter_fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.enabled = enabled,
            None => self.filter_fields.push(FilterField { field, enabled }),
        }
    }

    /// Sets the volume, clamped to `0.0..=1.0`. Non-finite values are ignored.
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}

/// Stored form of [`PersistedState`]. Filter fields are reduced to the
/// enabled keys.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    filter_fields: Vec<TagField>,
    sort_criteria: &'a [SortCriterion],
    volume: f64,
    show_extra_tag_fields: bool,
    theme: Theme,
    panel_sizes: &'a PanelSizes,
    directories: &'a [Utf8PathBuf],
}

/// Everything written to the [`STATE_KEY`] slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    /// User preferences.
    pub preferences: Preferences,
    /// Tracked directories, in tracker order.
    pub directories: Vec<Utf8PathBuf>,
}

impl PersistedState {
    /// Decodes a stored blob, merging it field by field over the defaults.
    ///
    /// Never fails: unparseable input yields the defaults, and each malformed
    /// field is logged and replaced by its default.
    ///
    /// # Examples
    ///
    /// ```
    /// use taggy_core::{PersistedState, Theme};
    ///
    /// let blob = r#"{"theme":"dark","volume":"loud","directories":["/music"]}"#;
    /// let state = PersistedState::from_blob(blob);
    /// assert_eq!(state.preferences.theme, Theme::Dark);
    /// assert!((state.preferences.volume - 1.0).abs() < f64::EPSILON);
    /// assert_eq!(state.directories.len(), 1);
    /// ```
    #[must_use]
    pub fn from_blob(blob: &str) -> Self {
        let value: Value = match serde_json::from_str(blob) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "Stored state is not valid JSON, using defaults");
                return Self::default();
            }
        };
        let Some(object) = value.as_object() else {
            warn!("Stored state is not an object, using defaults");
            return Self::default();
        };

        let mut preferences = Preferences::default();

        if let Some(enabled) = list_field::<TagField>(object, "filterFields") {
            for filter in &mut preferences.filter_fields {
                filter.enabled = enabled.contains(&filter.field);
            }
            for extra in enabled {
                preferences.set_filter_field(extra, true);
            }
        }
        if let Some(criteria) = list_field(object, "sortCriteria") {
            preferences.sort_criteria = criteria;
        }
        if let Some(volume) = field::<f64>(object, "volume") {
            if (0.0..=1.0).contains(&volume) {
                preferences.volume = volume;
            } else {
                warn!(volume, "Stored volume out of range, using default");
            }
        }
        if let Some(show) = field(object, "showExtraTagFields") {
            preferences.show_extra_tag_fields = show;
        }
        if let Some(theme) = field(object, "theme") {
            preferences.theme = theme;
        }
        if let Some(sizes) = field::<Map<String, Value>>(object, "panelSizes") {
            if let Some(main) = field(&sizes, "main") {
                preferences.panel_sizes.main = main;
            }
            if let Some(editor) = field(&sizes, "editor") {
                preferences.panel_sizes.editor = editor;
            }
        }

        let directories = field::<Vec<Value>>(object, "directories")
            .map(|dirs| decode_elements(dirs, "directories"))
            .unwrap_or_default();

        Self {
            preferences,
            directories,
        }
    }

    /// Encodes the state for storage.
    ///
    /// Only enabled filter fields are written.
    pub fn to_blob(&self) -> Result<String, StorageError> {
        let prefs = &self.preferences;
        let blob = Blob {
            filter_fields: prefs.enabled_filter_fields().collect(),
            sort_criteria: &prefs.sort_criteria,
            volume: prefs.volume,
            show_extra_tag_fields: prefs.show_extra_tag_fields,
            theme: prefs.theme,
            panel_sizes: &prefs.panel_sizes,
            directories: &self.directories,
        };
        Ok(serde_json::to_string(&blob)?)
    }
}

/// Decodes `object[key]`, logging and returning `None` when it is malformed.
fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            warn!(key, %error, "Ignoring malformed stored preference");
            None
        }
    }
}

/// Decodes a list field entry by entry. A non-empty list with no valid entry
/// counts as malformed and yields `None`.
fn list_field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<Vec<T>> {
    let values = field::<Vec<Value>>(object, key)?;
    let had_entries = !values.is_empty();
    let decoded: Vec<T> = decode_elements(values, key);
    if had_entries && decoded.is_empty() {
        warn!(key, "No valid entries in stored list, using default");
        return None;
    }
    Some(decoded)
}

/// Decodes each element on its own, dropping the ones that do not parse.
fn decode_elements<T: DeserializeOwned>(values: Vec<Value>, key: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match T::deserialize(&value) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                warn!(key, %error, "Dropping malformed stored entry");
                None
            }
        })
        .collect()
}
