// Combined actor ranking: fuse the count, rating-sum and average-rating
// orderings into one composite position.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::tally::{Bucket, Tally};
use super::{sort_descending, DimensionEntry};
use crate::fields::round_metric;

/// Position charged for an ordering an actor does not appear in. Grows with
/// the pool so an absent actor always ranks behind every ranked one.
pub const ABSENT_RANK: usize = 1000;

/// Why an actor landed where it did in the combined ranking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActorRankBreakdown {
    pub actor: String,
    pub count: u32,
    /// 0-based positions; `None` when the actor is missing from that ordering.
    pub count_rank: Option<usize>,
    pub rating_sum_rank: Option<usize>,
    pub average_rank: Option<usize>,
    pub average_index: f64,
}

fn positions<'a>(ordered: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    ordered.enumerate().map(|(pos, key)| (key, pos)).collect()
}

fn order_by<'a>(
    tally: &'a Tally,
    include: impl Fn(&Bucket) -> bool,
    metric: impl Fn(&Bucket) -> f64,
) -> Vec<&'a str> {
    let mut entries: Vec<(&str, f64)> = tally
        .iter()
        .filter(|(_, bucket)| include(bucket))
        .map(|(key, bucket)| (key, metric(bucket)))
        .collect();
    entries.sort_by(|a, b| sort_descending(a.1, b.1));
    entries.into_iter().map(|(key, _)| key).collect()
}

/// Fuse three independent actor orderings into the top `top_n` actors.
///
/// Only the `2 * top_n` most frequent actors are candidates. Returns the fused
/// list (metric = average index, lower is better) and the breakdown for every
/// candidate in fused order.
pub fn fuse_actor_ranks(
    actors: &Tally,
    min_samples: u32,
    top_n: usize,
) -> (Vec<DimensionEntry>, Vec<ActorRankBreakdown>) {
    let by_count = order_by(actors, |_| true, |b| b.count as f64);
    let by_rating_sum = order_by(actors, |_| true, |b| b.balanced_sum);
    let by_average = order_by(
        actors,
        |b| b.samples >= min_samples,
        |b| round_metric(b.average(), 2),
    );

    let count_pos = positions(by_count.iter().copied());
    let rating_pos = positions(by_rating_sum.iter().copied());
    let average_pos = positions(by_average.iter().copied());

    let absent = ABSENT_RANK.max(actors.len() + 1);

    let mut breakdowns: Vec<ActorRankBreakdown> = by_count
        .iter()
        .take(top_n.saturating_mul(2))
        .map(|&actor| {
            let count_rank = count_pos.get(actor).copied();
            let rating_sum_rank = rating_pos.get(actor).copied();
            let average_rank = average_pos.get(actor).copied();
            let total: usize = [count_rank, rating_sum_rank, average_rank]
                .into_iter()
                .map(|rank| rank.unwrap_or(absent))
                .sum();
            ActorRankBreakdown {
                actor: actor.to_string(),
                count: actors.get(actor).map(|b| b.count).unwrap_or(0),
                count_rank,
                rating_sum_rank,
                average_rank,
                average_index: total as f64 / 3.0,
            }
        })
        .collect();

    breakdowns.sort_by(|a, b| a.average_index.total_cmp(&b.average_index));

    debug!(
        "fuse_actor_ranks: actors={}, candidates={}, averaged={}, absent_rank={}",
        actors.len(),
        breakdowns.len(),
        by_average.len(),
        absent
    );

    let fused = breakdowns
        .iter()
        .take(top_n)
        .map(|b| DimensionEntry::new(&b.actor, round_metric(b.average_index, 2)))
        .collect();

    (fused, breakdowns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_tally(rows: &[(&str, u32, f64, u32)]) -> Tally {
        let mut tally = Tally::default();
        for &(actor, count, rating, samples) in rows {
            for _ in 0..count {
                tally.add(actor, rating, 1.0, false);
            }
            tally.entry(actor).samples = samples;
        }
        tally
    }

    #[test]
    fn test_absent_from_average_ranking_is_penalized() {
        // "Star" leads on count and rating sum but lacks samples for the average
        let tally = actor_tally(&[("Star", 5, 5.0, 3), ("Regular", 4, 3.0, 4)]);

        let (fused, details) = fuse_actor_ranks(&tally, 4, 5);

        let star = details.iter().find(|d| d.actor == "Star").unwrap();
        assert_eq!(star.count_rank, Some(0));
        assert_eq!(star.rating_sum_rank, Some(0));
        assert_eq!(star.average_rank, None);
        assert!((star.average_index - 1000.0 / 3.0).abs() < 1e-9);

        let regular = details.iter().find(|d| d.actor == "Regular").unwrap();
        assert_eq!(regular.average_rank, Some(0));
        assert!((regular.average_index - 2.0 / 3.0).abs() < 1e-9);

        assert_eq!(fused[0].key, "Regular");
        assert_eq!(fused[1].key, "Star");
        assert_eq!(fused[1].metric, 333.33);
    }

    #[test]
    fn test_candidates_limited_to_twice_top_n() {
        let tally = actor_tally(&[
            ("A", 6, 1.0, 6),
            ("B", 5, 1.0, 5),
            ("C", 4, 5.0, 4),
            ("D", 3, 5.0, 3),
            ("E", 2, 5.0, 2),
        ]);

        let (fused, details) = fuse_actor_ranks(&tally, 1, 2);
        assert_eq!(details.len(), 4);
        assert!(details.iter().all(|d| d.actor != "E"));
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_empty_tally() {
        let (fused, details) = fuse_actor_ranks(&Tally::default(), 3, 5);
        assert!(fused.is_empty());
        assert!(details.is_empty());
    }
}
