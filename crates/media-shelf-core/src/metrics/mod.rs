// Aggregation engine for the metrics view.
//
// One pass over the records fills a `Tally` per dimension; every ranking mode
// is then a different ordering of the same buckets. Nothing is cached: callers
// recompute on every record-set or selection change.

mod finance;
mod fusion;
mod tally;


use media_shelf_config::MetricsConfig;
use media_shelf_models::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{check_rating, MetricsError, SkippedRecord};
use crate::fields::{format_duration, round_metric};

pub use finance::{FinanceEntry, FinanceMetrics};
pub use fusion::{fuse_actor_ranks, ActorRankBreakdown, ABSENT_RANK};
pub use tally::{Bucket, Tally};

/// Cast entries billed before this position count double under `BalancedRating`.
pub const LEAD_CAST_SIZE: usize = 4;
pub const LEAD_CAST_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RankingMode {
    #[default]
    Count,
    SimpleRating,
    BalancedRating,
    AverageRating,
    BlockbusterCount,
    /// Rank fusion for actors; other dimensions fall back to `Count`.
    CombinedScore,
}

impl RankingMode {
    pub const ALL: [RankingMode; 6] = [
        RankingMode::Count,
        RankingMode::SimpleRating,
        RankingMode::BalancedRating,
        RankingMode::AverageRating,
        RankingMode::BlockbusterCount,
        RankingMode::CombinedScore,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RankingMode::Count => "Count",
            RankingMode::SimpleRating => "Simple Rating",
            RankingMode::BalancedRating => "Balanced Rating",
            RankingMode::AverageRating => "Avg Rating",
            RankingMode::BlockbusterCount => "Blockbuster Count",
            RankingMode::CombinedScore => "Combined Score",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dimension {
    Genre,
    Actor,
    Director,
    ProductionCompany,
    Collection,
    Year,
}

impl Dimension {
    fn top_n(&self, config: &MetricsConfig) -> usize {
        match self {
            Dimension::Genre => config.top_genres,
            Dimension::Actor => config.top_actors,
            Dimension::Director => config.top_directors,
            Dimension::ProductionCompany => config.top_production_companies,
            Dimension::Collection => config.top_collections,
            Dimension::Year => config.top_years,
        }
    }

    /// Genres are ranked by average without a sample floor.
    fn min_samples(&self, config: &MetricsConfig) -> u32 {
        match self {
            Dimension::Genre => 1,
            Dimension::Actor => config.min_actor_samples,
            Dimension::Director => config.min_director_samples,
            Dimension::ProductionCompany => config.min_company_samples,
            Dimension::Collection => config.min_collection_samples,
            Dimension::Year => config.min_year_samples,
        }
    }
}

/// One ranked key of a dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionEntry {
    pub key: String,
    pub metric: f64,
}

impl DimensionEntry {
    pub fn new(key: &str, metric: f64) -> Self {
        Self {
            key: key.to_string(),
            metric,
        }
    }
}

/// Selection state the metrics depend on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MetricsQuery {
    pub mode: RankingMode,
    pub include_watchlist: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WatchTotals {
    pub movie_minutes: u64,
    pub series_minutes: u64,
    pub movie_watch_time: String,
    pub series_watch_time: String,
    pub total_watch_time: String,
    pub distinct_actors: usize,
    pub distinct_directors: usize,
    pub blockbusters: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LibraryMetrics {
    pub mode: RankingMode,
    pub records_considered: usize,
    pub top_genres: Vec<DimensionEntry>,
    pub top_actors: Vec<DimensionEntry>,
    pub top_directors: Vec<DimensionEntry>,
    pub top_production_companies: Vec<DimensionEntry>,
    pub top_collections: Vec<DimensionEntry>,
    pub top_years: Vec<DimensionEntry>,
    /// Every genre, highest taste index first.
    pub genre_taste_index: Vec<DimensionEntry>,
    /// Filled only in `CombinedScore` mode.
    pub actor_rank_details: Vec<ActorRankBreakdown>,
    pub totals: WatchTotals,
    pub finance: FinanceMetrics,
    pub skipped: Vec<SkippedRecord>,
}

impl LibraryMetrics {
    pub fn top(&self, dimension: Dimension) -> &[DimensionEntry] {
        match dimension {
            Dimension::Genre => &self.top_genres,
            Dimension::Actor => &self.top_actors,
            Dimension::Director => &self.top_directors,
            Dimension::ProductionCompany => &self.top_production_companies,
            Dimension::Collection => &self.top_collections,
            Dimension::Year => &self.top_years,
        }
    }

    /// Detail for the "why is this actor ranked here" view.
    pub fn explain_actor(&self, actor: &str) -> Option<&ActorRankBreakdown> {
        self.actor_rank_details.iter().find(|d| d.actor == actor)
    }
}

/// Descending order for finite metrics; keeps equal keys in input order under a stable sort.
pub(crate) fn sort_descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Taste index of one title: user rating scaled to 10 points over the public vote.
pub fn taste_index(record: &Record) -> f64 {
    let user_scaled = record.rating_or_zero() * 2.0;
    let public = record.external_vote_or_zero();
    if user_scaled > 0.0 && public > 0.0 {
        user_scaled / public
    } else {
        0.0
    }
}

#[derive(Default)]
struct Accumulator {
    genres: Tally,
    actors: Tally,
    directors: Tally,
    companies: Tally,
    collections: Tally,
    years: Tally,
    genre_taste_sum: HashMap<String, f64>,
    actor_collection_appearances: HashMap<(String, String), u32>,
    movie_minutes: u64,
    series_minutes: u64,
    blockbusters: usize,
    finance: finance::FinanceTracker,
}

impl Accumulator {
    fn observe(&mut self, record: &Record, mode: RankingMode, config: &MetricsConfig) {
        let rating = record.rating_or_zero();
        let blockbuster = rating >= config.blockbuster_threshold;
        if blockbuster {
            self.blockbusters += 1;
        }

        let taste = taste_index(record);
        for genre in &record.genres {
            self.genres.add(genre, rating, 1.0, blockbuster);
            *self.genre_taste_sum.entry(genre.clone()).or_insert(0.0) += taste;
        }

        let collection = record
            .collection
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        for (position, actor) in record.cast.iter().enumerate() {
            let weight = if mode == RankingMode::BalancedRating && position < LEAD_CAST_SIZE {
                LEAD_CAST_WEIGHT
            } else {
                1.0
            };
            let bucket = self.actors.add(actor, rating, weight, blockbuster);

            if let Some(collection) = collection {
                let seen = self
                    .actor_collection_appearances
                    .entry((actor.clone(), collection.to_string()))
                    .or_insert(0);
                *seen += 1;
                if *seen > config.max_movies_from_collection {
                    bucket.samples -= 1;
                }
            }
        }

        if let Some(director) = record.director.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            self.directors.add(director, rating, 1.0, blockbuster);
        }

        for company in &record.production_companies {
            self.companies.add(company, rating, 1.0, blockbuster);
        }

        if let Some(collection) = collection {
            self.collections.add(collection, rating, 1.0, blockbuster);
        }

        if let Some(year) = record.release_year.as_deref().filter(|y| !y.is_empty()) {
            self.years.add(year, rating, 1.0, blockbuster);
        }

        if let Some(minutes) = record.duration_minutes {
            self.movie_minutes += u64::from(minutes);
        }
        if let Some(minutes) = record.series_watch_minutes() {
            self.series_minutes += minutes;
        }

        self.finance.observe(record);
    }

    fn tally(&self, dimension: Dimension) -> &Tally {
        match dimension {
            Dimension::Genre => &self.genres,
            Dimension::Actor => &self.actors,
            Dimension::Director => &self.directors,
            Dimension::ProductionCompany => &self.companies,
            Dimension::Collection => &self.collections,
            Dimension::Year => &self.years,
        }
    }

    fn taste_ranking(&self) -> Vec<DimensionEntry> {
        let mut ranked: Vec<DimensionEntry> = self
            .genres
            .iter()
            .map(|(genre, bucket)| {
                let sum = self.genre_taste_sum.get(genre).copied().unwrap_or(0.0);
                DimensionEntry::new(genre, round_metric(sum / bucket.count as f64, 3))
            })
            .collect();
        ranked.sort_by(|a, b| sort_descending(a.metric, b.metric));
        ranked
    }
}

/// Order one dimension's buckets under `mode` and keep the top `top_n`.
///
/// `CombinedScore` is only meaningful for actors and is handled by
/// `fuse_actor_ranks`; here it falls back to `Count`.
pub fn rank_tally(tally: &Tally, mode: RankingMode, min_samples: u32, top_n: usize) -> Vec<DimensionEntry> {
    let mut ranked: Vec<DimensionEntry> = tally
        .iter()
        .filter_map(|(key, bucket)| {
            let metric = match mode {
                RankingMode::Count | RankingMode::CombinedScore => bucket.count as f64,
                RankingMode::SimpleRating => bucket.rating_sum,
                RankingMode::BalancedRating => bucket.balanced_sum,
                RankingMode::AverageRating => {
                    if bucket.samples < min_samples {
                        return None;
                    }
                    round_metric(bucket.average(), 2)
                }
                RankingMode::BlockbusterCount => {
                    if bucket.blockbusters == 0 {
                        return None;
                    }
                    bucket.blockbusters as f64
                }
            };
            Some(DimensionEntry::new(key, metric))
        })
        .collect();

    ranked.sort_by(|a, b| sort_descending(a.metric, b.metric));
    ranked.truncate(top_n);
    ranked
}

/// Compute every metrics list and total for the current selection.
///
/// Watchlist entries are left out unless `include_watchlist` is set. Records
/// with a malformed rating are skipped and reported, never fatal; an invalid
/// configuration is rejected before any work is done.
pub fn compute_metrics(
    records: &[Record],
    query: &MetricsQuery,
    config: &MetricsConfig,
) -> Result<LibraryMetrics, MetricsError> {
    config.validate()?;

    let mut acc = Accumulator::default();
    let mut skipped = Vec::new();
    let mut considered = 0;

    for record in records {
        if !query.include_watchlist && record.is_watchlist() {
            continue;
        }
        if let Err(fault) = check_rating(record) {
            warn!("Leaving {:?} out of metrics: {}", record.title, fault);
            skipped.push(SkippedRecord::new(record, &fault));
            continue;
        }
        acc.observe(record, query.mode, config);
        considered += 1;
    }

    let finance = std::mem::take(&mut acc.finance).finish(config.top_budget);

    let rank = |dimension: Dimension| {
        rank_tally(
            acc.tally(dimension),
            query.mode,
            dimension.min_samples(config),
            dimension.top_n(config),
        )
    };

    let (top_actors, actor_rank_details) = if query.mode == RankingMode::CombinedScore {
        fuse_actor_ranks(&acc.actors, config.min_actor_samples, config.top_actors)
    } else {
        (rank(Dimension::Actor), Vec::new())
    };

    let totals = WatchTotals {
        movie_minutes: acc.movie_minutes,
        series_minutes: acc.series_minutes,
        movie_watch_time: format_duration(acc.movie_minutes),
        series_watch_time: format_duration(acc.series_minutes),
        total_watch_time: format_duration(acc.movie_minutes + acc.series_minutes),
        distinct_actors: acc.actors.len(),
        distinct_directors: acc.directors.len(),
        blockbusters: acc.blockbusters,
    };

    let metrics = LibraryMetrics {
        mode: query.mode,
        records_considered: considered,
        top_genres: rank(Dimension::Genre),
        top_actors,
        top_directors: rank(Dimension::Director),
        top_production_companies: rank(Dimension::ProductionCompany),
        top_collections: rank(Dimension::Collection),
        top_years: rank(Dimension::Year),
        genre_taste_index: acc.taste_ranking(),
        actor_rank_details,
        totals,
        finance,
        skipped,
    };

    debug!(
        "compute_metrics: mode={:?}, records={}, considered={}, skipped={}, genres={}, actors={}, directors={}",
        query.mode,
        records.len(),
        considered,
        metrics.skipped.len(),
        acc.genres.len(),
        acc.actors.len(),
        acc.directors.len()
    );

    Ok(metrics)
}
