use media_shelf_models::{MediaType, Record};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{check_rating, check_title, RecordFault, SkippedRecord};

/// How a multi-genre selection relates to a record's genres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GenreOperator {
    /// At least one selected genre.
    #[default]
    Or,
    /// Every selected genre.
    And,
}

impl GenreOperator {
    /// An empty selection folds to the operator's identity: nothing for `Or`,
    /// everything for `And`.
    pub fn relates(&self, selected: &[String], genres: &[String]) -> bool {
        match self {
            GenreOperator::Or => selected.iter().any(|g| genres.contains(g)),
            GenreOperator::And => selected.iter().all(|g| genres.contains(g)),
        }
    }
}

/// Active predicates of the library grid. Empty collections and a zero
/// rating floor are no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterSpec {
    pub search: String,
    pub genres: Vec<String>,
    pub genre_operator: GenreOperator,
    pub types: Vec<MediaType>,
    pub min_rating: f64,
    pub watchlist_only: bool,
    pub languages: Vec<String>,
    pub providers: Vec<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.genres.is_empty()
            && self.types.is_empty()
            && self.min_rating <= 0.0
            && !self.watchlist_only
            && self.languages.is_empty()
            && self.providers.is_empty()
    }

    /// Whether `record` passes every active predicate.
    ///
    /// Fails only when a field the active predicates read is malformed.
    pub fn matches(&self, record: &Record) -> Result<bool, RecordFault> {
        check_rating(record)?;

        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            check_title(record)?;
            if !search_matches(record, &needle) {
                return Ok(false);
            }
        }

        if !self.genres.is_empty() && !self.genre_operator.relates(&self.genres, &record.genres) {
            return Ok(false);
        }

        if !self.types.is_empty() && !self.types.contains(&record.media_type) {
            return Ok(false);
        }

        if record.rating_or_zero() < self.min_rating {
            return Ok(false);
        }

        if self.watchlist_only && !record.is_watchlist() {
            return Ok(false);
        }

        if !self.languages.is_empty() {
            let known = record
                .original_language
                .as_ref()
                .is_some_and(|lang| self.languages.contains(lang));
            if !known {
                return Ok(false);
            }
        }

        if !self.providers.is_empty()
            && !record.available_on.iter().any(|p| self.providers.contains(p))
        {
            return Ok(false);
        }

        Ok(true)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn search_matches(record: &Record, needle: &str) -> bool {
    contains_ci(&record.title, needle)
        || record.director.as_deref().is_some_and(|d| contains_ci(d, needle))
        || record.cast.iter().any(|a| contains_ci(a, needle))
        || record.production_companies.iter().any(|c| contains_ci(c, needle))
        || record.collection.as_deref().is_some_and(|c| contains_ci(c, needle))
        || record.release_year.as_deref().is_some_and(|y| contains_ci(y, needle))
        || record.available_on.iter().any(|p| contains_ci(p, needle))
}

/// Records that passed the filter, in input order, plus the ones that could
/// not be evaluated.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome<'a> {
    pub records: Vec<&'a Record>,
    pub skipped: Vec<SkippedRecord>,
}

/// Apply `spec` to every record. A record whose predicates fault is left out
/// and reported; the rest of the batch is still filtered.
pub fn apply_filters<'a>(records: &'a [Record], spec: &FilterSpec) -> FilterOutcome<'a> {
    let mut outcome = FilterOutcome::default();

    for record in records {
        match spec.matches(record) {
            Ok(true) => outcome.records.push(record),
            Ok(false) => {}
            Err(fault) => {
                warn!("Skipping {:?} ({}) while filtering: {}", record.title, record.file_path, fault);
                outcome.skipped.push(SkippedRecord::new(record, &fault));
            }
        }
    }

    debug!(
        "apply_filters: input={}, matched={}, skipped={}",
        records.len(),
        outcome.records.len(),
        outcome.skipped.len()
    );

    outcome
}
