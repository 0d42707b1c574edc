/// Status value marking an item that has not been watched yet.
///
/// Status is free text in the notes; this is the only value with special
/// meaning (excluded from "watched" aggregates, boosted in recommendations).
pub const WATCHLIST: &str = "Watchlist";

/// Exact match, as written by the note templates.
pub fn is_watchlist(status: &str) -> bool {
    status == WATCHLIST
}
