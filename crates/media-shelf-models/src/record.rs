use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::status;

/// One movie or series note, normalized from its frontmatter.
///
/// Records are rebuilt from the note store on every refresh and never mutated
/// by the engines; filtering and aggregation always produce new views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Record {
    /// Display and search key. Empty means the note had no title.
    pub title: String,
    pub media_type: MediaType,
    pub status: String,
    /// User rating on the 0-5 scale, half-point steps. Absent coerces to 0.
    pub rating: Option<f64>,
    /// Public rating from the external database (0-10).
    pub external_vote: Option<f64>,
    pub popularity: Option<f64>,
    pub genres: Vec<String>,
    /// Billing order matters: the first entries are the leads.
    pub cast: Vec<String>,
    /// Kept as one string even when the note lists several directors.
    pub director: Option<String>,
    pub production_companies: Vec<String>,
    pub collection: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<String>,
    pub duration_minutes: Option<u32>,
    pub episode_runtime_minutes: Option<u32>,
    pub total_episodes: Option<u32>,
    pub total_seasons: Option<u32>,
    pub episodes_seen: Option<u32>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub original_language: Option<String>,
    pub available_on: Vec<String>,
    pub external_id: String,
    pub file_path: String,
    /// Frontmatter keys the typed model does not consume, in key order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum MediaType {
    #[default]
    Movie,
    Series,
}

impl MediaType {
    /// Parse the frontmatter `Type` value. Returns `None` for unknown labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "movie" | "film" => Some(MediaType::Movie),
            "series" | "tv" | "show" | "tv series" | "tv show" => Some(MediaType::Series),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Series => "Series",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Record {
    pub fn is_watchlist(&self) -> bool {
        status::is_watchlist(&self.status)
    }

    /// User rating with absence coerced to 0.
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn external_vote_or_zero(&self) -> f64 {
        self.external_vote.unwrap_or(0.0)
    }

    pub fn popularity_or_zero(&self) -> f64 {
        self.popularity.unwrap_or(0.0)
    }

    /// Minutes of a series actually watched: episode runtime times episodes seen.
    /// Only defined when both values are present.
    pub fn series_watch_minutes(&self) -> Option<u64> {
        match (self.episode_runtime_minutes, self.episodes_seen) {
            (Some(runtime), Some(seen)) => Some(runtime as u64 * seen as u64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse("Movie"), Some(MediaType::Movie));
        assert_eq!(MediaType::parse(" series "), Some(MediaType::Series));
        assert_eq!(MediaType::parse("TV"), Some(MediaType::Series));
        assert_eq!(MediaType::parse("Podcast"), None);
    }

    #[test]
    fn test_series_watch_minutes_requires_both_fields() {
        let mut record = Record {
            title: "Show".to_string(),
            media_type: MediaType::Series,
            episode_runtime_minutes: Some(42),
            ..Record::default()
        };
        assert_eq!(record.series_watch_minutes(), None);

        record.episodes_seen = Some(10);
        assert_eq!(record.series_watch_minutes(), Some(420));
    }

    #[test]
    fn test_watchlist_status() {
        let record = Record {
            title: "Later".to_string(),
            status: "Watchlist".to_string(),
            ..Record::default()
        };
        assert!(record.is_watchlist());
        assert_eq!(record.rating_or_zero(), 0.0);
    }
}
