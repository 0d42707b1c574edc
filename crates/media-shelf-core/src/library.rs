// Building typed records from note frontmatter, plus the library-wide
// catalogs (properties, facets) the filter selectors are populated from.

use chrono::{Datelike, NaiveDate};
use media_shelf_models::{MediaType, Record};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::fields::{parse_duration_minutes, parse_number, split_list};

/// Raw frontmatter of one note, as handed over by the note store.
pub type Frontmatter = BTreeMap<String, Value>;

pub const KEY_TITLE: &str = "Title";
pub const KEY_TYPE: &str = "Type";
pub const KEY_STATUS: &str = "Status";
pub const KEY_RATING: &str = "Rating";
pub const KEY_EXTERNAL_VOTE: &str = "Avg vote";
pub const KEY_POPULARITY: &str = "Popularity";
pub const KEY_GENRE: &str = "Genre";
pub const KEY_CAST: &str = "Cast";
pub const KEY_DIRECTOR: &str = "Director";
pub const KEY_PRODUCTION_COMPANY: &str = "production_company";
pub const KEY_COLLECTION: &str = "Collection";
pub const KEY_RELEASE_DATE: &str = "Release Date";
pub const KEY_DURATION: &str = "Duration";
pub const KEY_EPISODE_RUNTIME: &str = "episode_runtime";
pub const KEY_TOTAL_EPISODES: &str = "total_episodes";
pub const KEY_TOTAL_SEASONS: &str = "total_seasons";
pub const KEY_EPISODES_SEEN: &str = "episodes_seen";
pub const KEY_BUDGET: &str = "budget";
pub const KEY_REVENUE: &str = "revenue";
pub const KEY_LANGUAGE: &str = "original_language";
pub const KEY_AVAILABLE_ON: &str = "Available On";
pub const KEY_EXTERNAL_ID: &str = "TMDB ID";
pub const KEY_FILE_PATH: &str = "filePath";

/// Keys consumed by the typed record, in display order.
pub const TYPED_KEYS: &[&str] = &[
    KEY_TITLE,
    KEY_TYPE,
    KEY_STATUS,
    KEY_RATING,
    KEY_EXTERNAL_VOTE,
    KEY_POPULARITY,
    KEY_GENRE,
    KEY_CAST,
    KEY_DIRECTOR,
    KEY_PRODUCTION_COMPANY,
    KEY_COLLECTION,
    KEY_RELEASE_DATE,
    KEY_DURATION,
    KEY_EPISODE_RUNTIME,
    KEY_TOTAL_EPISODES,
    KEY_TOTAL_SEASONS,
    KEY_EPISODES_SEEN,
    KEY_BUDGET,
    KEY_REVENUE,
    KEY_LANGUAGE,
    KEY_AVAILABLE_ON,
    KEY_EXTERNAL_ID,
    KEY_FILE_PATH,
];

/// A frontmatter value that could not be coerced; the field is treated as absent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldWarning {
    pub file_path: String,
    pub field: String,
    pub value: String,
    pub reason: String,
}

/// A note that is not a media entry at all.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedEntry {
    pub file_path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedEntry>,
    pub warnings: Vec<FieldWarning>,
}

/// Text form of a frontmatter value. Lists are joined with ", " so both
/// YAML lists and comma-joined strings go through the same splitting.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

struct FieldReader<'a> {
    frontmatter: &'a Frontmatter,
    file_path: String,
    warnings: Vec<FieldWarning>,
}

impl<'a> FieldReader<'a> {
    fn text(&self, key: &str) -> Option<String> {
        self.frontmatter.get(key).and_then(value_text)
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.text(key).map(|t| split_list(&t)).unwrap_or_default()
    }

    fn warn(&mut self, key: &str, value: &str, reason: &str) {
        self.warnings.push(FieldWarning {
            file_path: self.file_path.clone(),
            field: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        });
    }

    fn number(&mut self, key: &str) -> Option<f64> {
        if let Some(n) = self.frontmatter.get(key).and_then(Value::as_f64) {
            return Some(n);
        }
        let text = self.text(key)?;
        let parsed = parse_number(&text);
        if parsed.is_none() {
            self.warn(key, &text, "not a number");
        }
        parsed
    }

    fn count(&mut self, key: &str) -> Option<u32> {
        let n = self.number(key)?;
        if n < 0.0 || n > u32::MAX as f64 {
            self.warn(key, &n.to_string(), "out of range");
            return None;
        }
        Some(n as u32)
    }

    fn duration(&mut self, key: &str) -> Option<u32> {
        if let Some(n) = self.frontmatter.get(key).and_then(Value::as_f64) {
            if (0.0..=u32::MAX as f64).contains(&n) {
                return Some(n as u32);
            }
        }
        let text = self.text(key)?;
        match parse_duration_minutes(&text) {
            0 => {
                self.warn(key, &text, "no '<n> minutes' duration");
                None
            }
            minutes => Some(minutes),
        }
    }
}

fn leading_year(text: &str) -> Option<String> {
    let year: String = text.trim().chars().take(4).collect();
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        Some(year)
    } else {
        None
    }
}

/// Build a typed record from one note's frontmatter.
///
/// Never fails: fields that cannot be coerced are treated as absent and
/// reported in the returned warnings.
pub fn record_from_frontmatter(frontmatter: &Frontmatter) -> (Record, Vec<FieldWarning>) {
    let file_path = frontmatter
        .get(KEY_FILE_PATH)
        .and_then(value_text)
        .unwrap_or_default();
    let mut reader = FieldReader {
        frontmatter,
        file_path: file_path.clone(),
        warnings: Vec::new(),
    };

    let media_type = match reader.text(KEY_TYPE) {
        Some(raw) => MediaType::parse(&raw).unwrap_or_else(|| {
            reader.warn(KEY_TYPE, &raw, "unknown type, using Movie");
            MediaType::Movie
        }),
        None => MediaType::Movie,
    };

    let rating = reader.number(KEY_RATING);
    if let Some(r) = rating {
        if !(0.0..=5.0).contains(&r) {
            reader.warn(KEY_RATING, &r.to_string(), "outside the 0-5 scale");
        }
    }

    let release_text = reader.text(KEY_RELEASE_DATE);
    let release_date = release_text
        .as_deref()
        .and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok());
    let release_year = match (release_date, release_text.as_deref()) {
        (Some(date), _) => Some(date.year().to_string()),
        (None, Some(text)) => {
            let year = leading_year(text);
            if year.is_none() {
                reader.warn(KEY_RELEASE_DATE, text, "no recognizable year");
            }
            year
        }
        (None, None) => None,
    };

    let extra = frontmatter
        .iter()
        .filter(|(key, _)| !TYPED_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| value_text(value).map(|text| (key.clone(), text)))
        .collect();

    let record = Record {
        title: reader.text(KEY_TITLE).unwrap_or_default(),
        media_type,
        status: reader.text(KEY_STATUS).unwrap_or_default(),
        rating,
        external_vote: reader.number(KEY_EXTERNAL_VOTE),
        popularity: reader.number(KEY_POPULARITY),
        genres: reader.list(KEY_GENRE),
        cast: reader.list(KEY_CAST),
        director: reader.text(KEY_DIRECTOR),
        production_companies: reader.list(KEY_PRODUCTION_COMPANY),
        collection: reader.text(KEY_COLLECTION),
        release_date,
        release_year,
        duration_minutes: reader.duration(KEY_DURATION),
        episode_runtime_minutes: reader.count(KEY_EPISODE_RUNTIME),
        total_episodes: reader.count(KEY_TOTAL_EPISODES),
        total_seasons: reader.count(KEY_TOTAL_SEASONS),
        episodes_seen: reader.count(KEY_EPISODES_SEEN),
        budget: reader.number(KEY_BUDGET),
        revenue: reader.number(KEY_REVENUE),
        original_language: reader.text(KEY_LANGUAGE),
        available_on: reader.list(KEY_AVAILABLE_ON),
        external_id: reader.text(KEY_EXTERNAL_ID).unwrap_or_default(),
        file_path,
        extra,
    };

    (record, reader.warnings)
}

/// Load every media note of a refresh. Notes without an external id are not
/// media entries and are skipped.
pub fn load_records(entries: &[Frontmatter]) -> LoadReport {
    let mut report = LoadReport::default();

    for entry in entries {
        let (record, warnings) = record_from_frontmatter(entry);

        if record.external_id.is_empty() {
            warn!("Skipping note without {}: {}", KEY_EXTERNAL_ID, record.file_path);
            report.skipped.push(SkippedEntry {
                file_path: record.file_path,
                reason: format!("missing {}", KEY_EXTERNAL_ID),
            });
            continue;
        }

        for warning in &warnings {
            warn!(
                "{}: could not read {} ({:?}): {}",
                warning.file_path, warning.field, warning.value, warning.reason
            );
        }
        report.warnings.extend(warnings);
        report.records.push(record);
    }

    debug!(
        "load_records: entries={}, records={}, skipped={}, warnings={}",
        entries.len(),
        report.records.len(),
        report.skipped.len(),
        report.warnings.len()
    );

    report
}

fn present_typed_keys(record: &Record) -> Vec<&'static str> {
    let present = [
        (KEY_TITLE, !record.title.is_empty()),
        (KEY_TYPE, true),
        (KEY_STATUS, !record.status.is_empty()),
        (KEY_RATING, record.rating.is_some()),
        (KEY_EXTERNAL_VOTE, record.external_vote.is_some()),
        (KEY_POPULARITY, record.popularity.is_some()),
        (KEY_GENRE, !record.genres.is_empty()),
        (KEY_CAST, !record.cast.is_empty()),
        (KEY_DIRECTOR, record.director.is_some()),
        (KEY_PRODUCTION_COMPANY, !record.production_companies.is_empty()),
        (KEY_COLLECTION, record.collection.is_some()),
        (KEY_RELEASE_DATE, record.release_year.is_some()),
        (KEY_DURATION, record.duration_minutes.is_some()),
        (KEY_EPISODE_RUNTIME, record.episode_runtime_minutes.is_some()),
        (KEY_TOTAL_EPISODES, record.total_episodes.is_some()),
        (KEY_TOTAL_SEASONS, record.total_seasons.is_some()),
        (KEY_EPISODES_SEEN, record.episodes_seen.is_some()),
        (KEY_BUDGET, record.budget.is_some()),
        (KEY_REVENUE, record.revenue.is_some()),
        (KEY_LANGUAGE, record.original_language.is_some()),
        (KEY_AVAILABLE_ON, !record.available_on.is_empty()),
        (KEY_EXTERNAL_ID, !record.external_id.is_empty()),
    ];
    present
        .into_iter()
        .filter(|(_, is_present)| *is_present)
        .map(|(key, _)| key)
        .collect()
}

fn join(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Display text of one property of `record`, typed or extra.
pub fn property_value(record: &Record, key: &str) -> Option<String> {
    let number = |n: Option<f64>| n.map(|n| n.to_string());
    let count = |n: Option<u32>| n.map(|n| n.to_string());

    match key {
        KEY_TITLE => Some(record.title.clone()).filter(|t| !t.is_empty()),
        KEY_TYPE => Some(record.media_type.to_string()),
        KEY_STATUS => Some(record.status.clone()).filter(|s| !s.is_empty()),
        KEY_RATING => number(record.rating),
        KEY_EXTERNAL_VOTE => number(record.external_vote),
        KEY_POPULARITY => number(record.popularity),
        KEY_GENRE => join(&record.genres),
        KEY_CAST => join(&record.cast),
        KEY_DIRECTOR => record.director.clone(),
        KEY_PRODUCTION_COMPANY => join(&record.production_companies),
        KEY_COLLECTION => record.collection.clone(),
        KEY_RELEASE_DATE => record
            .release_date
            .map(|d| d.to_string())
            .or_else(|| record.release_year.clone()),
        KEY_DURATION => record.duration_minutes.map(|m| format!("{} minutes", m)),
        KEY_EPISODE_RUNTIME => count(record.episode_runtime_minutes),
        KEY_TOTAL_EPISODES => count(record.total_episodes),
        KEY_TOTAL_SEASONS => count(record.total_seasons),
        KEY_EPISODES_SEEN => count(record.episodes_seen),
        KEY_BUDGET => number(record.budget),
        KEY_REVENUE => number(record.revenue),
        KEY_LANGUAGE => record.original_language.clone(),
        KEY_AVAILABLE_ON => join(&record.available_on),
        KEY_EXTERNAL_ID => Some(record.external_id.clone()).filter(|id| !id.is_empty()),
        KEY_FILE_PATH => Some(record.file_path.clone()).filter(|p| !p.is_empty()),
        other => record.extra.get(other).cloned(),
    }
}

/// Every property shown anywhere in the library, typed keys first.
pub fn property_catalog(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut catalog = Vec::new();

    let typed = TYPED_KEYS
        .iter()
        .filter(|key| records.iter().any(|r| present_typed_keys(r).contains(*key)))
        .map(|key| key.to_string());
    let extra: BTreeSet<String> = records
        .iter()
        .flat_map(|r| r.extra.keys().cloned())
        .collect();

    for key in typed.chain(extra) {
        if seen.insert(key.clone()) {
            catalog.push(key);
        }
    }
    catalog
}

/// Configured properties that actually exist in the library, in configured order.
pub fn default_properties(records: &[Record], configured: &[String]) -> Vec<String> {
    let catalog = property_catalog(records);
    configured
        .iter()
        .filter(|prop| catalog.contains(prop))
        .cloned()
        .collect()
}

/// Distinct values offered by the filter selectors.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Facets {
    pub genres: Vec<String>,
    pub types: Vec<MediaType>,
    pub languages: Vec<String>,
    pub providers: Vec<String>,
}

pub fn facets(records: &[Record]) -> Facets {
    let mut genres = BTreeSet::new();
    let mut types = BTreeSet::new();
    let mut languages = BTreeSet::new();
    let mut providers = BTreeSet::new();

    for record in records {
        genres.extend(record.genres.iter().cloned());
        types.insert(record.media_type);
        if let Some(ref language) = record.original_language {
            languages.insert(language.clone());
        }
        providers.extend(record.available_on.iter().cloned());
    }

    Facets {
        genres: genres.into_iter().collect(),
        types: types.into_iter().collect(),
        languages: languages.into_iter().collect(),
        providers: providers.into_iter().collect(),
    }
}

/// Configured default language filters restricted to languages present in the library.
pub fn default_languages(records: &[Record], configured: &[String]) -> Vec<String> {
    let available: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.original_language.as_deref())
        .collect();
    configured
        .iter()
        .map(|lang| lang.trim())
        .filter(|lang| available.contains(lang))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frontmatter(value: Value) -> Frontmatter {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_from_frontmatter() {
        let fm = frontmatter(json!({
            "Title": "Heat",
            "Type": "Movie",
            "Status": "Watched",
            "Rating": "4.5",
            "Avg vote": 7.9,
            "Popularity": "45.2",
            "Genre": "Action, Crime, Drama",
            "Cast": ["Al Pacino", "Robert De Niro"],
            "Director": "Michael Mann",
            "production_company": "Regency Enterprises, Forward Pass",
            "Release Date": "1995-12-15",
            "Duration": "170 minutes",
            "budget": 60000000,
            "revenue": "187436818",
            "original_language": "en",
            "Available On": "Netflix, Prime Video",
            "TMDB ID": 949,
            "filePath": "Movies/Heat.md",
            "Poster": "https://img/heat.jpg"
        }));

        let (record, warnings) = record_from_frontmatter(&fm);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
        assert_eq!(record.title, "Heat");
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.external_vote, Some(7.9));
        assert_eq!(record.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(record.cast, vec!["Al Pacino", "Robert De Niro"]);
        assert_eq!(record.production_companies.len(), 2);
        assert_eq!(record.release_year.as_deref(), Some("1995"));
        assert_eq!(record.duration_minutes, Some(170));
        assert_eq!(record.revenue, Some(187436818.0));
        assert_eq!(record.external_id, "949");
        assert_eq!(record.extra.get("Poster").map(String::as_str), Some("https://img/heat.jpg"));
        assert!(!record.extra.contains_key("Title"));
    }

    #[test]
    fn test_malformed_fields_become_warnings() {
        let fm = frontmatter(json!({
            "Title": "Odd",
            "Type": "Podcast",
            "Rating": "great",
            "Release Date": "sometime",
            "Duration": "long",
            "TMDB ID": "1",
            "filePath": "Movies/Odd.md"
        }));

        let (record, warnings) = record_from_frontmatter(&fm);
        assert_eq!(record.media_type, MediaType::Movie);
        assert_eq!(record.rating, None);
        assert_eq!(record.rating_or_zero(), 0.0);
        assert_eq!(record.release_year, None);
        assert_eq!(record.duration_minutes, None);
        let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["Type", "Rating", "Release Date", "Duration"]);
    }

    #[test]
    fn test_release_year_falls_back_to_leading_digits() {
        let fm = frontmatter(json!({"Title": "Old", "Release Date": "1968", "TMDB ID": "2"}));
        let (record, _) = record_from_frontmatter(&fm);
        assert_eq!(record.release_date, None);
        assert_eq!(record.release_year.as_deref(), Some("1968"));
    }

    #[test]
    fn test_series_fields() {
        let fm = frontmatter(json!({
            "Title": "Dark",
            "Type": "Series",
            "episode_runtime": "55",
            "total_episodes": 26,
            "total_seasons": 3,
            "episodes_seen": "26",
            "TMDB ID": "70523"
        }));
        let (record, warnings) = record_from_frontmatter(&fm);
        assert!(warnings.is_empty());
        assert_eq!(record.media_type, MediaType::Series);
        assert_eq!(record.series_watch_minutes(), Some(55 * 26));
    }

    #[test]
    fn test_load_records_skips_notes_without_external_id() {
        let entries = vec![
            frontmatter(json!({"Title": "A", "TMDB ID": "1", "filePath": "a.md"})),
            frontmatter(json!({"Title": "Reading list", "filePath": "notes.md"})),
            frontmatter(json!({"Title": "B", "TMDB ID": "2", "Rating": "x", "filePath": "b.md"})),
        ];

        let report = load_records(&entries);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file_path, "notes.md");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].file_path, "b.md");
    }

    #[test]
    fn test_property_catalog_and_defaults() {
        let entries = vec![
            frontmatter(json!({"Title": "A", "Rating": 4, "TMDB ID": "1", "Poster": "p.jpg"})),
            frontmatter(json!({"Title": "B", "TMDB ID": "2", "Mood": "cozy", "Poster": "q.jpg"})),
        ];
        let records = load_records(&entries).records;

        let catalog = property_catalog(&records);
        assert_eq!(catalog, vec!["Title", "Type", "Rating", "TMDB ID", "Mood", "Poster"]);

        let configured = vec!["Poster".to_string(), "Budget".to_string(), "Rating".to_string()];
        assert_eq!(default_properties(&records, &configured), vec!["Poster", "Rating"]);
    }

    #[test]
    fn test_property_value() {
        let fm = frontmatter(json!({
            "Title": "Heat",
            "Rating": 4.5,
            "Cast": "Al Pacino, Robert De Niro",
            "Duration": "170 minutes",
            "TMDB ID": "949",
            "Mood": "tense"
        }));
        let (record, _) = record_from_frontmatter(&fm);

        assert_eq!(property_value(&record, "Rating").as_deref(), Some("4.5"));
        assert_eq!(property_value(&record, "Type").as_deref(), Some("Movie"));
        assert_eq!(property_value(&record, "Cast").as_deref(), Some("Al Pacino, Robert De Niro"));
        assert_eq!(property_value(&record, "Duration").as_deref(), Some("170 minutes"));
        assert_eq!(property_value(&record, "Mood").as_deref(), Some("tense"));
        assert_eq!(property_value(&record, "Director"), None);
        assert_eq!(property_value(&record, "Nope"), None);
    }

    #[test]
    fn test_facets_and_default_languages() {
        let records = vec![
            Record {
                genres: vec!["Drama".to_string(), "Crime".to_string()],
                original_language: Some("en".to_string()),
                available_on: vec!["Netflix".to_string()],
                ..Record::default()
            },
            Record {
                media_type: MediaType::Series,
                genres: vec!["Drama".to_string()],
                original_language: Some("de".to_string()),
                ..Record::default()
            },
        ];

        let f = facets(&records);
        assert_eq!(f.genres, vec!["Crime", "Drama"]);
        assert_eq!(f.types, vec![MediaType::Movie, MediaType::Series]);
        assert_eq!(f.languages, vec!["de", "en"]);
        assert_eq!(f.providers, vec!["Netflix"]);

        let configured = vec!["en".to_string(), " fr ".to_string()];
        assert_eq!(default_languages(&records, &configured), vec!["en"]);
    }
}
