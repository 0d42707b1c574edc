use super::{header_cell, load_config, load_library, report_skipped, styled_table};
use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use comfy_table::Cell;
use media_shelf_core::fields::format_money;
use media_shelf_core::metrics::{ActorRankBreakdown, FinanceEntry};
use media_shelf_core::{compute_metrics, Dimension, DimensionEntry, LibraryMetrics, RankingMode, ViewEvent, ViewState};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub struct MetricsOptions {
    pub mode: RankingMode,
    pub include_watchlist: bool,
    pub explain: Option<String>,
}

pub fn run_metrics(library: &Path, config_path: &Path, opts: MetricsOptions, output: &Output) -> Result<()> {
    let config = load_config(config_path)?;
    let report = load_library(library, output)?;

    let mode = if opts.explain.is_some() {
        if opts.mode != RankingMode::CombinedScore && opts.mode != RankingMode::Count {
            output.warn("--explain ranks actors by combined score; ignoring --mode");
        }
        RankingMode::CombinedScore
    } else {
        opts.mode
    };

    let state = ViewState::default().apply_all([
        ViewEvent::RankingMode(mode),
        ViewEvent::IncludeWatchlist(opts.include_watchlist),
    ]);
    let metrics = compute_metrics(&report.records, &state.metrics_query(), &config.metrics)
        .map_err(|e| eyre!("Cannot compute metrics: {}", e))?;

    if let Some(actor) = opts.explain.as_deref() {
        let breakdown = metrics
            .explain_actor(actor)
            .ok_or_else(|| eyre!("{} is not among the combined-score candidates", actor))?;
        if output.is_human() {
            print_explanation(breakdown, output);
        } else {
            let value = serde_json::to_value(breakdown).wrap_err("Failed to serialize rank breakdown")?;
            output.json(&json!({ "type": "actor_rank", "breakdown": value }));
        }
        return Ok(());
    }

    if output.is_human() {
        if !output.is_quiet() {
            print_metrics(&metrics);
        }
    } else {
        let value = serde_json::to_value(&metrics).wrap_err("Failed to serialize metrics")?;
        output.json(&json!({ "type": "metrics", "metrics": value }));
    }

    report_skipped(metrics.skipped.len(), "metrics", output);
    Ok(())
}

const DIMENSIONS: [(Dimension, &str); 6] = [
    (Dimension::Genre, "Top Genres"),
    (Dimension::Actor, "Top Actors"),
    (Dimension::Director, "Top Directors"),
    (Dimension::ProductionCompany, "Top Production Companies"),
    (Dimension::Collection, "Top Collections"),
    (Dimension::Year, "Top Years"),
];

fn format_metric(mode: RankingMode, dimension: Dimension, metric: f64) -> String {
    match mode {
        RankingMode::Count | RankingMode::BlockbusterCount => format!("{:.0}", metric),
        RankingMode::SimpleRating | RankingMode::BalancedRating => format!("{:.1}", metric),
        RankingMode::AverageRating => format!("{:.2}", metric),
        RankingMode::CombinedScore if dimension == Dimension::Actor => format!("{:.2}", metric),
        RankingMode::CombinedScore => format!("{:.0}", metric),
    }
}

fn metric_label(mode: RankingMode, dimension: Dimension) -> &'static str {
    if mode == RankingMode::CombinedScore && dimension != Dimension::Actor {
        RankingMode::Count.label()
    } else {
        mode.label()
    }
}

fn print_ranked(title: &str, value_label: &str, entries: &[DimensionEntry], fmt: impl Fn(f64) -> String) {
    if entries.is_empty() {
        println!("{}", format!("{}: nothing to rank", title).bright_black());
        println!();
        return;
    }
    let mut table = styled_table(vec![header_cell(title), header_cell(value_label)]);
    for entry in entries {
        table.add_row(vec![Cell::new(&entry.key), Cell::new(fmt(entry.metric))]);
    }
    println!("{}", table);
    println!();
}

fn print_finance(title: &str, entries: &[FinanceEntry]) {
    if entries.is_empty() {
        return;
    }
    let mut table = styled_table(vec![
        header_cell(title),
        header_cell("Budget"),
        header_cell("Revenue"),
        header_cell("Ratio"),
    ]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(format_money(entry.budget)),
            Cell::new(format_money(entry.revenue)),
            Cell::new(format!("{:.2}", entry.ratio)),
        ]);
    }
    println!("{}", table);
    println!();
}

fn print_metrics(metrics: &LibraryMetrics) {
    println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
    println!(
        "{} {} {}",
        "║".bright_white(),
        "Library Metrics".bright_cyan().bold(),
        format!("({}, {} titles)", metrics.mode.label(), metrics.records_considered).bright_black()
    );
    println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
    println!();

    let totals = &metrics.totals;
    let mut totals_table = styled_table(vec![header_cell("Totals"), header_cell("")]);
    let or_none = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    totals_table.add_row(vec![Cell::new("Movie watch time"), Cell::new(or_none(&totals.movie_watch_time))]);
    totals_table.add_row(vec![Cell::new("Series watch time"), Cell::new(or_none(&totals.series_watch_time))]);
    totals_table.add_row(vec![Cell::new("Total watch time"), Cell::new(or_none(&totals.total_watch_time))]);
    totals_table.add_row(vec![Cell::new("Distinct actors"), Cell::new(totals.distinct_actors)]);
    totals_table.add_row(vec![Cell::new("Distinct directors"), Cell::new(totals.distinct_directors)]);
    totals_table.add_row(vec![Cell::new("Blockbusters"), Cell::new(totals.blockbusters)]);
    println!("{}", totals_table);
    println!();

    for (dimension, title) in DIMENSIONS {
        print_ranked(title, metric_label(metrics.mode, dimension), metrics.top(dimension), |m| {
            format_metric(metrics.mode, dimension, m)
        });
    }

    print_ranked("Genre Taste Index", "Index", &metrics.genre_taste_index, |m| format!("{:.3}", m));

    let finance = &metrics.finance;
    if finance.tracked > 0 {
        println!(
            "{}",
            format!(
                "Box office: {} tracked, {} overperformed, {} underperformed",
                finance.tracked, finance.overperformer_count, finance.underperformer_count
            )
            .bold()
        );
        println!();
        print_finance("Overperformers", &finance.overperformers);
        print_finance("Underperformers", &finance.underperformers);
        print_finance("Highest Budget", &finance.highest_budget);
        print_finance("Lowest Budget", &finance.lowest_budget);
        print_finance("Most Revenue", &finance.most_revenue);
        print_finance("Least Revenue", &finance.least_revenue);
    }
}

fn print_explanation(breakdown: &ActorRankBreakdown, output: &Output) {
    if output.is_quiet() {
        return;
    }
    let rank = |r: Option<usize>| match r {
        Some(r) => (r + 1).to_string(),
        None => "not ranked".red().to_string(),
    };
    let mut table = styled_table(vec![header_cell(&breakdown.actor), header_cell("Position")]);
    table.add_row(vec![Cell::new("By appearances"), Cell::new(rank(breakdown.count_rank))]);
    table.add_row(vec![Cell::new("By rating sum"), Cell::new(rank(breakdown.rating_sum_rank))]);
    table.add_row(vec![Cell::new("By average rating"), Cell::new(rank(breakdown.average_rank))]);
    table.add_row(vec![Cell::new("Appearances"), Cell::new(breakdown.count)]);
    table.add_row(vec![
        Cell::new("Average index").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(format!("{:.2}", breakdown.average_index)),
    ]);
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_formatting_follows_mode() {
        assert_eq!(format_metric(RankingMode::Count, Dimension::Genre, 3.0), "3");
        assert_eq!(format_metric(RankingMode::SimpleRating, Dimension::Genre, 12.5), "12.5");
        assert_eq!(format_metric(RankingMode::AverageRating, Dimension::Year, 4.333), "4.33");
        assert_eq!(format_metric(RankingMode::CombinedScore, Dimension::Actor, 333.333), "333.33");
        assert_eq!(format_metric(RankingMode::CombinedScore, Dimension::Genre, 4.0), "4");
    }

    #[test]
    fn test_combined_score_label_falls_back_for_other_dimensions() {
        assert_eq!(metric_label(RankingMode::CombinedScore, Dimension::Actor), "Combined Score");
        assert_eq!(metric_label(RankingMode::CombinedScore, Dimension::Genre), "Count");
    }
}
