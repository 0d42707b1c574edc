use media_shelf_models::Record;
use serde::Serialize;
use std::cmp::Ordering;

use super::sort_descending;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinanceEntry {
    pub title: String,
    pub budget: f64,
    pub revenue: f64,
    /// revenue / budget
    pub ratio: f64,
}

/// Budget and box-office leaderboards.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FinanceMetrics {
    pub tracked: usize,
    pub underperformer_count: usize,
    pub overperformer_count: usize,
    /// Worst ratio first.
    pub underperformers: Vec<FinanceEntry>,
    /// Best ratio first.
    pub overperformers: Vec<FinanceEntry>,
    pub highest_budget: Vec<FinanceEntry>,
    pub lowest_budget: Vec<FinanceEntry>,
    pub most_revenue: Vec<FinanceEntry>,
    pub least_revenue: Vec<FinanceEntry>,
}

/// Accumulates titles that report both a positive budget and a revenue figure.
#[derive(Debug, Default)]
pub struct FinanceTracker {
    entries: Vec<FinanceEntry>,
}

impl FinanceTracker {
    pub fn observe(&mut self, record: &Record) {
        let (Some(budget), Some(revenue)) = (record.budget, record.revenue) else {
            return;
        };
        if budget <= 0.0 || !budget.is_finite() || !revenue.is_finite() {
            return;
        }
        self.entries.push(FinanceEntry {
            title: record.title.clone(),
            budget,
            revenue,
            ratio: revenue / budget,
        });
    }

    pub fn finish(self, top_n: usize) -> FinanceMetrics {
        let entries = &self.entries;
        let is_under = |e: &FinanceEntry| e.ratio < 1.0;
        let is_over = |e: &FinanceEntry| e.ratio >= 1.0;
        let all = |_: &FinanceEntry| true;

        FinanceMetrics {
            tracked: entries.len(),
            underperformer_count: entries.iter().filter(|&e| is_under(e)).count(),
            overperformer_count: entries.iter().filter(|&e| is_over(e)).count(),
            underperformers: leaderboard(entries, top_n, is_under, |a, b| a.ratio.total_cmp(&b.ratio)),
            overperformers: leaderboard(entries, top_n, is_over, |a, b| sort_descending(a.ratio, b.ratio)),
            highest_budget: leaderboard(entries, top_n, all, |a, b| sort_descending(a.budget, b.budget)),
            lowest_budget: leaderboard(entries, top_n, all, |a, b| a.budget.total_cmp(&b.budget)),
            most_revenue: leaderboard(entries, top_n, all, |a, b| sort_descending(a.revenue, b.revenue)),
            least_revenue: leaderboard(entries, top_n, all, |a, b| a.revenue.total_cmp(&b.revenue)),
        }
    }
}

fn leaderboard(
    entries: &[FinanceEntry],
    top_n: usize,
    keep: impl Fn(&FinanceEntry) -> bool,
    cmp: impl Fn(&FinanceEntry, &FinanceEntry) -> Ordering,
) -> Vec<FinanceEntry> {
    let mut board: Vec<FinanceEntry> = entries.iter().filter(|&e| keep(e)).cloned().collect();
    board.sort_by(|a, b| cmp(a, b));
    board.truncate(top_n);
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_record(title: &str, budget: Option<f64>, revenue: Option<f64>) -> Record {
        Record {
            title: title.to_string(),
            budget,
            revenue,
            ..Record::default()
        }
    }

    #[test]
    fn test_only_positive_budget_with_revenue_is_tracked() {
        let mut tracker = FinanceTracker::default();
        tracker.observe(&create_record("No budget", None, Some(10.0)));
        tracker.observe(&create_record("Zero budget", Some(0.0), Some(10.0)));
        tracker.observe(&create_record("No revenue", Some(10.0), None));
        tracker.observe(&create_record("Flop", Some(100.0), Some(0.0)));

        let metrics = tracker.finish(5);
        assert_eq!(metrics.tracked, 1);
        assert_eq!(metrics.underperformers[0].title, "Flop");
        assert_eq!(metrics.underperformers[0].ratio, 0.0);
    }

    #[test]
    fn test_classification_and_leaderboards() {
        let mut tracker = FinanceTracker::default();
        tracker.observe(&create_record("Even", Some(50.0), Some(50.0)));
        tracker.observe(&create_record("Hit", Some(10.0), Some(100.0)));
        tracker.observe(&create_record("Miss", Some(200.0), Some(20.0)));
        tracker.observe(&create_record("Soft", Some(100.0), Some(80.0)));

        let metrics = tracker.finish(2);
        assert_eq!(metrics.underperformer_count, 2);
        assert_eq!(metrics.overperformer_count, 2);

        let titles = |entries: &[FinanceEntry]| -> Vec<String> {
            entries.iter().map(|e| e.title.clone()).collect()
        };
        assert_eq!(titles(&metrics.underperformers), vec!["Miss", "Soft"]);
        // ratio exactly 1 is an overperformer
        assert_eq!(titles(&metrics.overperformers), vec!["Hit", "Even"]);
        assert_eq!(titles(&metrics.highest_budget), vec!["Miss", "Soft"]);
        assert_eq!(titles(&metrics.lowest_budget), vec!["Hit", "Even"]);
        assert_eq!(titles(&metrics.most_revenue), vec!["Hit", "Soft"]);
        assert_eq!(titles(&metrics.least_revenue), vec!["Miss", "Even"]);
    }
}
