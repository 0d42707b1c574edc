use media_shelf_models::{Candidate, MediaType, Recommendation, Record};
use std::collections::HashMap;
use tracing::debug;

use crate::filter::GenreOperator;
use crate::metrics::sort_descending;

pub const MAX_RECOMMENDATIONS: usize = 10;
/// Added to the occurrences of a candidate already on the watchlist.
pub const WATCHLIST_BOOST: u32 = 3;

/// Records that can be offered as "I liked these" seeds.
///
/// Watchlist entries and records without genres never qualify. An empty
/// genre selection matches nothing under `Or` and everything under `And`.
pub fn seed_pool<'a>(
    records: &'a [Record],
    genres: &[String],
    operator: GenreOperator,
    media_type: MediaType,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| !r.is_watchlist())
        .filter(|r| !r.genres.is_empty())
        .filter(|r| r.media_type == media_type)
        .filter(|r| operator.relates(genres, &r.genres))
        .collect()
}

/// Select `title`, or deselect it if it is already selected. Returns whether
/// the title is selected afterwards.
pub fn toggle_seed(selected: &mut Vec<String>, title: &str) -> bool {
    if let Some(pos) = selected.iter().position(|t| t == title) {
        selected.remove(pos);
        false
    } else {
        selected.push(title.to_string());
        true
    }
}

/// Merge the candidate lists of every seed into a ranked shortlist.
///
/// Candidates are grouped by external id, keeping the first one seen as the
/// representative. Items already in the library are dropped unless they are
/// on the watchlist, in which case they are boosted and flagged instead.
pub fn rank_recommendations(candidate_lists: &[Vec<Candidate>], library: &[Record]) -> Vec<Recommendation> {
    let mut order: Vec<Recommendation> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for candidate in candidate_lists.iter().flatten() {
        match index.get(candidate.external_id.as_str()) {
            Some(&idx) => order[idx].occurrences += 1,
            None => {
                index.insert(candidate.external_id.as_str(), order.len());
                order.push(Recommendation {
                    candidate: candidate.clone(),
                    occurrences: 1,
                    already_tracked: false,
                });
            }
        }
    }
    let unique = order.len();

    let tracked: HashMap<&str, &Record> = library
        .iter()
        .filter(|r| !r.external_id.is_empty())
        .map(|r| (r.external_id.as_str(), r))
        .collect();

    let mut kept: Vec<Recommendation> = order
        .into_iter()
        .filter_map(|mut rec| match tracked.get(rec.candidate.external_id.as_str()) {
            None => Some(rec),
            Some(record) if record.is_watchlist() => {
                rec.occurrences += WATCHLIST_BOOST;
                rec.already_tracked = true;
                Some(rec)
            }
            Some(_) => None,
        })
        .collect();

    kept.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| sort_descending(a.candidate.rating, b.candidate.rating))
    });
    kept.truncate(MAX_RECOMMENDATIONS);

    debug!(
        "rank_recommendations: seeds={}, unique={}, returned={}",
        candidate_lists.len(),
        unique,
        kept.len()
    );

    kept
}
