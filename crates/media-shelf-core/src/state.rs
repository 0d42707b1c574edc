// Dashboard selection state as pure transitions. The caller owns the event
// loop (and any debouncing of search keystrokes); every change produces a new
// state and the view is derived from scratch.

use media_shelf_config::MetricsConfig;
use media_shelf_models::{MediaType, Record};
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, SkippedRecord};
use crate::filter::{FilterSpec, GenreOperator};
use crate::metrics::{compute_metrics, LibraryMetrics, MetricsQuery, RankingMode};
use crate::sort::{filter_and_sort, SortKey, SortSpec};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewState {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub mode: RankingMode,
    pub include_watchlist: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Search(String),
    ToggleGenre(String),
    GenreOperator(GenreOperator),
    ToggleType(MediaType),
    MinRating(f64),
    ToggleWatchlistOnly,
    Languages(Vec<String>),
    ToggleProvider(String),
    SortKey(SortKey),
    ToggleSortDirection,
    RankingMode(RankingMode),
    IncludeWatchlist(bool),
    ClearFilters,
}

/// Everything the dashboard renders for one state.
#[derive(Debug, Clone)]
pub struct LibraryView<'a> {
    pub records: Vec<&'a Record>,
    /// Records left out of the grid because a predicate could not be evaluated.
    pub skipped: Vec<SkippedRecord>,
    pub metrics: LibraryMetrics,
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

impl ViewState {
    /// Initial state with the configured default languages preselected.
    pub fn with_languages(languages: Vec<String>) -> Self {
        let mut state = Self::default();
        state.filter.languages = languages;
        state
    }

    pub fn apply(mut self, event: ViewEvent) -> Self {
        match event {
            ViewEvent::Search(text) => self.filter.search = text,
            ViewEvent::ToggleGenre(genre) => toggle(&mut self.filter.genres, genre),
            ViewEvent::GenreOperator(op) => self.filter.genre_operator = op,
            ViewEvent::ToggleType(media_type) => toggle(&mut self.filter.types, media_type),
            ViewEvent::MinRating(rating) => self.filter.min_rating = rating,
            ViewEvent::ToggleWatchlistOnly => self.filter.watchlist_only = !self.filter.watchlist_only,
            ViewEvent::Languages(languages) => self.filter.languages = languages,
            ViewEvent::ToggleProvider(provider) => toggle(&mut self.filter.providers, provider),
            ViewEvent::SortKey(key) => self.sort.key = key,
            ViewEvent::ToggleSortDirection => self.sort.direction = self.sort.direction.toggled(),
            ViewEvent::RankingMode(mode) => self.mode = mode,
            ViewEvent::IncludeWatchlist(include) => self.include_watchlist = include,
            ViewEvent::ClearFilters => self.filter = FilterSpec::default(),
        }
        self
    }

    pub fn apply_all(self, events: impl IntoIterator<Item = ViewEvent>) -> Self {
        events.into_iter().fold(self, ViewState::apply)
    }

    pub fn metrics_query(&self) -> MetricsQuery {
        MetricsQuery {
            mode: self.mode,
            include_watchlist: self.include_watchlist,
        }
    }

    /// Recompute the grid and the metrics for this state.
    pub fn derive<'a>(&self, records: &'a [Record], config: &MetricsConfig) -> Result<LibraryView<'a>, MetricsError> {
        let metrics = compute_metrics(records, &self.metrics_query(), config)?;
        let outcome = filter_and_sort(records, &self.filter, &self.sort);
        Ok(LibraryView {
            records: outcome.records,
            skipped: outcome.skipped,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    fn create_record(title: &str, genres: &[&str], rating: f64) -> Record {
        Record {
            title: title.to_string(),
            status: "Seen".to_string(),
            rating: Some(rating),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..Record::default()
        }
    }

    #[test]
    fn test_toggles_are_their_own_inverse() {
        let state = ViewState::default()
            .apply(ViewEvent::ToggleGenre("Drama".to_string()))
            .apply(ViewEvent::ToggleType(MediaType::Series))
            .apply(ViewEvent::ToggleWatchlistOnly)
            .apply(ViewEvent::ToggleSortDirection);
        assert_eq!(state.filter.genres, vec!["Drama".to_string()]);
        assert_eq!(state.filter.types, vec![MediaType::Series]);
        assert!(state.filter.watchlist_only);
        assert_eq!(state.sort.direction, SortDirection::Ascending);

        let back = state
            .apply(ViewEvent::ToggleGenre("Drama".to_string()))
            .apply(ViewEvent::ToggleType(MediaType::Series))
            .apply(ViewEvent::ToggleWatchlistOnly)
            .apply(ViewEvent::ToggleSortDirection);
        assert_eq!(back, ViewState::default());
    }

    #[test]
    fn test_clear_filters_keeps_sort_and_mode() {
        let state = ViewState::with_languages(vec!["en".to_string()]).apply_all([
            ViewEvent::Search("heat".to_string()),
            ViewEvent::MinRating(3.0),
            ViewEvent::SortKey(SortKey::Alphabetical),
            ViewEvent::RankingMode(RankingMode::AverageRating),
            ViewEvent::ClearFilters,
        ]);
        assert!(state.filter.is_empty());
        assert_eq!(state.sort.key, SortKey::Alphabetical);
        assert_eq!(state.mode, RankingMode::AverageRating);
    }

    #[test]
    fn test_derive_recomputes_grid_and_metrics() {
        let records = vec![
            create_record("A", &["Drama"], 4.0),
            create_record("B", &["Drama", "Comedy"], 2.0),
        ];
        let config = MetricsConfig::default();

        let state = ViewState::default().apply(ViewEvent::ToggleGenre("Comedy".to_string()));
        let view = state.derive(&records, &config).unwrap();
        let titles: Vec<&str> = view.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B"]);
        // metrics ignore the grid filter
        assert_eq!(view.metrics.top_genres.len(), 2);

        let sorted = state
            .apply(ViewEvent::ClearFilters)
            .apply(ViewEvent::ToggleSortDirection)
            .derive(&records, &config)
            .unwrap();
        let titles: Vec<&str> = sorted.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }
}
