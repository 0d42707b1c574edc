use media_shelf_models::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::filter::{apply_filters, FilterOutcome, FilterSpec};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortKey {
    Alphabetical,
    #[default]
    Rating,
    ExternalVote,
    HiddenGem,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// `rating / popularity` with no guard: zero popularity yields infinity, or
/// NaN when the rating is zero as well.
pub fn hidden_gem_factor(record: &Record) -> f64 {
    record.rating_or_zero() / record.popularity_or_zero()
}

// NaN sorts above every number so it lands in one place whatever its sign bit
fn compare_metric(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Ascending comparison under `key`.
pub fn compare_records(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key {
        SortKey::Alphabetical => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
        SortKey::Rating => compare_metric(a.rating_or_zero(), b.rating_or_zero()),
        SortKey::ExternalVote => compare_metric(a.external_vote_or_zero(), b.external_vote_or_zero()),
        SortKey::HiddenGem => compare_metric(hidden_gem_factor(a), hidden_gem_factor(b)),
    }
}

/// Stable sort: records comparing equal keep their filtered order in either direction.
pub fn sort_records(records: &mut [&Record], spec: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = compare_records(a, b, spec.key);
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub fn filter_and_sort<'a>(records: &'a [Record], filter: &FilterSpec, sort: &SortSpec) -> FilterOutcome<'a> {
    let mut outcome = apply_filters(records, filter);
    sort_records(&mut outcome.records, sort);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_record(title: &str, rating: Option<f64>, vote: Option<f64>, popularity: Option<f64>) -> Record {
        Record {
            title: title.to_string(),
            rating,
            external_vote: vote,
            popularity,
            ..Record::default()
        }
    }

    fn sorted_titles(records: &[Record], key: SortKey, direction: SortDirection) -> Vec<String> {
        let mut refs: Vec<&Record> = records.iter().collect();
        sort_records(&mut refs, &SortSpec { key, direction });
        refs.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn test_default_sort_is_rating_descending() {
        let spec = SortSpec::default();
        assert_eq!(spec.key, SortKey::Rating);
        assert_eq!(spec.direction, SortDirection::Descending);
        assert_eq!(spec.direction.toggled(), SortDirection::Ascending);
    }

    #[test]
    fn test_alphabetical() {
        let records = vec![
            create_record("heat", None, None, None),
            create_record("Alien", None, None, None),
            create_record("Brazil", None, None, None),
        ];
        assert_eq!(
            sorted_titles(&records, SortKey::Alphabetical, SortDirection::Ascending),
            vec!["Alien", "Brazil", "heat"]
        );
        assert_eq!(
            sorted_titles(&records, SortKey::Alphabetical, SortDirection::Descending),
            vec!["heat", "Brazil", "Alien"]
        );
    }

    #[test]
    fn test_rating_and_external_vote_treat_missing_as_zero() {
        let records = vec![
            create_record("Unrated", None, None, None),
            create_record("Good", Some(4.0), Some(6.5), None),
            create_record("Great", Some(5.0), Some(8.1), None),
        ];
        assert_eq!(
            sorted_titles(&records, SortKey::Rating, SortDirection::Descending),
            vec!["Great", "Good", "Unrated"]
        );
        assert_eq!(
            sorted_titles(&records, SortKey::ExternalVote, SortDirection::Ascending),
            vec!["Unrated", "Good", "Great"]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            create_record("First", Some(3.0), None, None),
            create_record("Second", Some(3.0), None, None),
        ];
        assert_eq!(
            sorted_titles(&records, SortKey::Rating, SortDirection::Descending),
            vec!["First", "Second"]
        );
        assert_eq!(
            sorted_titles(&records, SortKey::Rating, SortDirection::Ascending),
            vec!["First", "Second"]
        );
    }

    #[test]
    fn test_hidden_gem_factor_has_no_zero_guard() {
        assert_eq!(hidden_gem_factor(&create_record("Gem", Some(4.0), None, Some(2.0))), 2.0);
        assert_eq!(
            hidden_gem_factor(&create_record("Obscure", Some(4.0), None, Some(0.0))),
            f64::INFINITY
        );
        assert!(hidden_gem_factor(&create_record("Nothing", None, None, None)).is_nan());
    }

    #[test]
    fn test_hidden_gem_ordering_places_nan_above_infinity() {
        let records = vec![
            create_record("Popular", Some(4.0), None, Some(100.0)),
            create_record("Nothing", None, None, None),
            create_record("Obscure", Some(4.0), None, Some(0.0)),
            create_record("Gem", Some(4.0), None, Some(2.0)),
        ];
        assert_eq!(
            sorted_titles(&records, SortKey::HiddenGem, SortDirection::Descending),
            vec!["Nothing", "Obscure", "Gem", "Popular"]
        );
    }

    #[test]
    fn test_filter_and_sort() {
        let records = vec![
            create_record("Low", Some(1.0), None, None),
            create_record("High", Some(5.0), None, None),
            create_record("Mid", Some(3.0), None, None),
        ];
        let filter = FilterSpec {
            min_rating: 2.0,
            ..FilterSpec::default()
        };
        let outcome = filter_and_sort(&records, &filter, &SortSpec::default());
        let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["High", "Mid"]);
    }
}
