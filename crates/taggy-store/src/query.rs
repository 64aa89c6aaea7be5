//! Search and ordering over the visible files.
//!
//! Search is a smart-case substring match: a query with no uppercase
//! characters matches case-insensitively. A file's score is the earliest
//! byte offset at which the query occurs in any enabled filter field, so
//! lower scores rank better.

use std::cmp::Ordering;

use taggy_core::{AudioFile, Preferences, SortCriterion, SortDirection, SortField, TagField};

/// A file that matched a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// The matching file.
    pub file: &'a AudioFile,
    /// Earliest match offset; `0` for an empty query.
    pub score: usize,
}

struct Needle {
    text: String,
    case_sensitive: bool,
}

impl Needle {
    fn new(query: &str) -> Self {
        let case_sensitive = query.chars().any(char::is_uppercase);
        let text = if case_sensitive {
            query.to_owned()
        } else {
            query.to_lowercase()
        };
        Self {
            text,
            case_sensitive,
        }
    }

    fn find(&self, haystack: &str) -> Option<usize> {
        if self.case_sensitive {
            haystack.find(&self.text)
        } else {
            haystack.to_lowercase().find(&self.text)
        }
    }
}

/// Returns the files matching `query` in any of `fields`, unsorted.
///
/// # Examples
///
/// ```
/// use taggy_core::{AudioFile, TagField};
/// use taggy_store::query::search;
///
/// let mut file = AudioFile::new("/music/a.mp3");
/// file.title = Some("Blue in Green".to_owned());
///
/// let hits = search([&file], "green", &[TagField::Title]);
/// assert_eq!(hits[0].score, 8);
/// assert!(search([&file], "Green", &[TagField::Artist]).is_empty());
/// ```
pub fn search<'a, I>(files: I, query: &str, fields: &[TagField]) -> Vec<Match<'a>>
where
    I: IntoIterator<Item = &'a AudioFile>,
{
    let query = query.trim();
    if query.is_empty() {
        return files.into_iter().map(|file| Match { file, score: 0 }).collect();
    }

    let needle = Needle::new(query);
    files
        .into_iter()
        .filter_map(|file| {
            fields
                .iter()
                .filter_map(|field| file.text(*field).and_then(|text| needle.find(&text)))
                .min()
                .map(|score| Match { file, score })
        })
        .collect()
}

/// Sorts matches by `criteria` in order, then by path.
pub fn sort_matches(matches: &mut [Match<'_>], criteria: &[SortCriterion]) {
    matches.sort_by(|a, b| {
        criteria
            .iter()
            .map(|criterion| compare(a, b, *criterion))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.file.path.cmp(&b.file.path))
    });
}

/// Searches with the enabled filter fields and sorts by the configured
/// criteria.
pub fn run<'a, I>(files: I, query: &str, preferences: &Preferences) -> Vec<Match<'a>>
where
    I: IntoIterator<Item = &'a AudioFile>,
{
    let fields: Vec<TagField> = preferences.enabled_filter_fields().collect();
    let mut matches = search(files, query, &fields);
    sort_matches(&mut matches, &preferences.sort_criteria);
    matches
}

fn compare(a: &Match<'_>, b: &Match<'_>, criterion: SortCriterion) -> Ordering {
    let direction = criterion.direction;
    match criterion.field {
        SortField::Score => directed(a.score.cmp(&b.score), direction),
        SortField::Title => compare_text(a.file, b.file, TagField::Title, direction),
        SortField::Artist => compare_text(a.file, b.file, TagField::Artist, direction),
        SortField::AlbumTitle => compare_text(a.file, b.file, TagField::AlbumTitle, direction),
        SortField::AlbumArtist => compare_text(a.file, b.file, TagField::AlbumArtist, direction),
        SortField::Genre => compare_text(a.file, b.file, TagField::Genre, direction),
        SortField::Year => missing_last(a.file.date, b.file.date, direction),
        SortField::TrackNumber => missing_last(a.file.track_number, b.file.track_number, direction),
        SortField::DiscNumber => missing_last(a.file.disc_number, b.file.disc_number, direction),
        SortField::Path => directed(a.file.path.cmp(&b.file.path), direction),
    }
}

fn compare_text(
    a: &AudioFile,
    b: &AudioFile,
    field: TagField,
    direction: SortDirection,
) -> Ordering {
    let key = |file: &AudioFile| file.text(field).map(|text| text.to_lowercase());
    missing_last(key(a), key(b), direction)
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

const fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(path: &str, title: Option<&str>, artist: Option<&str>) -> AudioFile {
        let mut file = AudioFile::new(path);
        file.title = title.map(str::to_owned);
        file.artist = artist.map(str::to_owned);
        file
    }

    fn paths<'a>(matches: &'a [Match<'a>]) -> Vec<&'a str> {
        matches.iter().map(|m| m.file.path.as_str()).collect()
    }

    #[test]
    fn test_smart_case() {
        let files = [
            track("/a.mp3", Some("Gold Dust"), None),
            track("/b.mp3", Some("golden"), None),
        ];
        let fields = [TagField::Title];

        assert_eq!(search(&files, "gold", &fields).len(), 2);
        let sensitive = search(&files, "Gold", &fields);
        assert_eq!(paths(&sensitive), ["/a.mp3"]);
    }

    #[test]
    fn test_score_is_earliest_offset_across_fields() {
        let file = track("/a.mp3", Some("The Moon Song"), Some("Moonface"));
        let hits = search([&file], "moon", &[TagField::Title, TagField::Artist]);
        assert_eq!(hits[0].score, 0);

        let hits = search([&file], "moon", &[TagField::Title]);
        assert_eq!(hits[0].score, 4);
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        let files = [track("/a.mp3", None, None), track("/b.mp3", None, None)];
        let hits = search(&files, "   ", &[TagField::Title]);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|hit| hit.score == 0));
    }

    #[test]
    fn test_default_ordering_by_score_then_title() {
        let files = [
            track("/1.mp3", Some("blues run"), None),
            track("/2.mp3", Some("blues"), None),
            track("/3.mp3", Some("all blues"), None),
            track("/4.mp3", Some("Blues Walk"), None),
        ];
        let preferences = Preferences::default();
        let hits = run(&files, "blues", &preferences);
        assert_eq!(paths(&hits), ["/2.mp3", "/1.mp3", "/4.mp3", "/3.mp3"]);
    }

    #[test]
    fn test_missing_values_sort_last_in_both_directions() {
        let files = [
            track("/none.mp3", None, None),
            track("/b.mp3", Some("b"), None),
            track("/a.mp3", Some("a"), None),
        ];
        let mut hits = search(&files, "", &[]);

        sort_matches(&mut hits, &[SortCriterion::asc(SortField::Title)]);
        assert_eq!(paths(&hits), ["/a.mp3", "/b.mp3", "/none.mp3"]);

        let desc = SortCriterion {
            field: SortField::Title,
            direction: SortDirection::Desc,
        };
        sort_matches(&mut hits, &[desc]);
        assert_eq!(paths(&hits), ["/b.mp3", "/a.mp3", "/none.mp3"]);
    }

    #[test]
    fn test_ties_break_on_path() {
        let files = [track("/z.mp3", Some("same"), None), track("/a.mp3", Some("Same"), None)];
        let mut hits = search(&files, "", &[]);
        sort_matches(&mut hits, &[SortCriterion::asc(SortField::Title)]);
        assert_eq!(paths(&hits), ["/a.mp3", "/z.mp3"]);
    }

    #[test]
    fn test_numeric_fields() {
        let mut first = AudioFile::new("/x.mp3");
        first.track_number = Some(2);
        let mut second = AudioFile::new("/y.mp3");
        second.track_number = Some(10);
        let files = [second, first];

        let mut hits = search(&files, "", &[]);
        sort_matches(&mut hits, &[SortCriterion::asc(SortField::TrackNumber)]);
        assert_eq!(paths(&hits), ["/x.mp3", "/y.mp3"]);
    }
}
