use super::{header_cell, load_library, styled_table};
use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;
use comfy_table::Cell;
use media_shelf_core::{rank_recommendations, seed_pool, toggle_seed, GenreOperator};
use media_shelf_models::{Candidate, MediaType, Recommendation, Record};
use owo_colors::OwoColorize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct DiscoverOptions {
    pub genres: Vec<String>,
    pub all_genres: bool,
    pub media_type: MediaType,
    pub candidates: Option<PathBuf>,
    pub seeds: Vec<String>,
}

/// Similar items per seed, keyed by the seed's external id.
pub type CandidateFile = BTreeMap<String, Vec<Candidate>>;

pub fn read_candidates(path: &Path) -> Result<CandidateFile> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read candidates file {}", path.display()))?;
    serde_json::from_str(&raw)
        .wrap_err_with(|| format!("{} is not a JSON object of candidate lists", path.display()))
}

/// Titles selected as seeds. Without explicit toggles every title in the pool is selected.
fn select_seeds(pool: &[&Record], toggles: &[String]) -> Vec<String> {
    if toggles.is_empty() {
        return pool.iter().map(|r| r.title.clone()).collect();
    }
    let mut selected = Vec::new();
    for title in toggles {
        toggle_seed(&mut selected, title);
    }
    selected
}

/// Candidate lists of the selected seeds, in pool order, plus the titles that had none.
fn lists_for<'a>(
    pool: &[&'a Record],
    selected: &[String],
    candidates: &CandidateFile,
) -> (Vec<Vec<Candidate>>, Vec<&'a str>) {
    let mut lists = Vec::new();
    let mut missing = Vec::new();
    for &record in pool.iter().filter(|r| selected.contains(&r.title)) {
        match candidates.get(&record.external_id) {
            Some(list) => lists.push(list.clone()),
            None => missing.push(record.title.as_str()),
        }
    }
    (lists, missing)
}

pub fn run_discover(library: &Path, opts: DiscoverOptions, output: &Output) -> Result<()> {
    let report = load_library(library, output)?;
    let operator = if opts.all_genres { GenreOperator::And } else { GenreOperator::Or };
    let pool = seed_pool(&report.records, &opts.genres, operator, opts.media_type);

    let Some(candidates_path) = opts.candidates.as_deref() else {
        print_pool(&pool, &opts, output);
        return Ok(());
    };

    let candidates = read_candidates(candidates_path)?;
    let selected = select_seeds(&pool, &opts.seeds);
    for title in &selected {
        if !pool.iter().any(|r| &r.title == title) {
            output.warn(format!("{} is not in the seed pool for the chosen genres and type", title));
        }
    }

    let (lists, missing) = lists_for(&pool, &selected, &candidates);
    for title in missing {
        output.warn(format!("No candidates supplied for seed {}", title));
    }
    tracing::info!("Ranking candidates from {} seed(s)", lists.len());

    let ranked = rank_recommendations(&lists, &report.records);

    if output.is_human() {
        if !output.is_quiet() {
            print_recommendations(&ranked);
        }
    } else {
        let value = serde_json::to_value(&ranked).wrap_err("Failed to serialize recommendations")?;
        output.json(&json!({
            "type": "recommendations",
            "seeds": lists.len(),
            "recommendations": value,
        }));
    }
    Ok(())
}

fn print_pool(pool: &[&Record], opts: &DiscoverOptions, output: &Output) {
    if !output.is_human() {
        let seeds: Vec<_> = pool
            .iter()
            .map(|r| json!({ "title": r.title, "external_id": r.external_id, "rating": r.rating }))
            .collect();
        output.json(&json!({ "type": "seed_pool", "seeds": seeds }));
        return;
    }

    if pool.is_empty() {
        if opts.genres.is_empty() && !opts.all_genres {
            output.info("Pick at least one --genre (or pass --all-genres) to build the seed pool.");
        } else {
            output.info(format!("No {} titles match the chosen genres.", opts.media_type));
        }
        return;
    }
    if output.is_quiet() {
        return;
    }

    let mut table = styled_table(vec![
        header_cell("Seed"),
        header_cell("Year"),
        header_cell("Rating"),
        header_cell("Genres"),
    ]);
    for record in pool {
        table.add_row(vec![
            Cell::new(&record.title),
            Cell::new(record.release_year.clone().unwrap_or_default()),
            Cell::new(record.rating.map(|r| r.to_string()).unwrap_or_default()),
            Cell::new(record.genres.join(", ")),
        ]);
    }
    println!("{}", table);
    println!("{}", "Pass --candidates FILE (and --seed TITLE to narrow) to rank recommendations.".bright_black());
}

fn print_recommendations(ranked: &[Recommendation]) {
    if ranked.is_empty() {
        println!("{}", "No recommendations: every suggestion is already in the library.".bright_black());
        return;
    }
    let mut table = styled_table(vec![
        header_cell("#"),
        header_cell("Title"),
        header_cell("Seeds"),
        header_cell("Vote"),
        header_cell("Votes"),
        header_cell(""),
    ]);
    for (pos, rec) in ranked.iter().enumerate() {
        let note = if rec.already_tracked {
            "already in watchlist".yellow().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(pos + 1),
            Cell::new(&rec.candidate.title),
            Cell::new(rec.occurrences),
            Cell::new(format!("{:.1}", rec.candidate.rating)),
            Cell::new(rec.candidate.vote_count),
            Cell::new(note),
        ]);
    }
    println!("{}", table);
}
