use super::{header_cell, load_config, load_library, report_skipped, styled_table};
use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use comfy_table::Cell;
use media_shelf_core::library::{default_languages, default_properties, facets, property_catalog, property_value};
use media_shelf_core::sort::hidden_gem_factor;
use media_shelf_core::{GenreOperator, SortKey, ViewEvent, ViewState};
use media_shelf_models::{MediaType, Record};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub struct ListOptions {
    pub search: Option<String>,
    pub genres: Vec<String>,
    pub all_genres: bool,
    pub types: Vec<MediaType>,
    pub min_rating: Option<f64>,
    pub watchlist: bool,
    pub languages: Vec<String>,
    pub providers: Vec<String>,
    pub sort: SortKey,
    pub ascending: bool,
    pub properties: Vec<String>,
    pub facets: bool,
}

fn dedup<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Translate command-line selections into the same transitions the dashboard applies.
fn list_events(opts: &ListOptions) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    if let Some(ref search) = opts.search {
        events.push(ViewEvent::Search(search.clone()));
    }
    events.extend(dedup(opts.genres.clone()).into_iter().map(ViewEvent::ToggleGenre));
    if opts.all_genres {
        events.push(ViewEvent::GenreOperator(GenreOperator::And));
    }
    events.extend(dedup(opts.types.clone()).into_iter().map(ViewEvent::ToggleType));
    if let Some(rating) = opts.min_rating {
        events.push(ViewEvent::MinRating(rating));
    }
    if opts.watchlist {
        events.push(ViewEvent::ToggleWatchlistOnly);
    }
    events.extend(dedup(opts.providers.clone()).into_iter().map(ViewEvent::ToggleProvider));
    events.push(ViewEvent::SortKey(opts.sort));
    if opts.ascending {
        events.push(ViewEvent::ToggleSortDirection);
    }
    events
}

pub fn run_list(library: &Path, config_path: &Path, opts: ListOptions, output: &Output) -> Result<()> {
    let config = load_config(config_path)?;
    let report = load_library(library, output)?;
    let records = &report.records;

    if opts.facets {
        return print_facets(records, output);
    }

    if let Some(rating) = opts.min_rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(eyre!("--min-rating must be between 0 and 5, got {}", rating));
        }
    }

    let languages = if opts.languages.is_empty() {
        default_languages(records, &config.library.default_language_filters)
    } else {
        dedup(opts.languages.clone())
    };
    let properties = if opts.properties.is_empty() {
        default_properties(records, &config.library.default_properties)
    } else {
        opts.properties.clone()
    };

    let state = ViewState::with_languages(languages).apply_all(list_events(&opts));
    let view = state
        .derive(records, &config.metrics)
        .map_err(|e| eyre!("Cannot build library view: {}", e))?;

    if output.is_human() {
        if !output.is_quiet() {
            let show_gem = state.sort.key == SortKey::HiddenGem;
            let mut header = vec![header_cell("Title")];
            header.extend(properties.iter().map(|p| header_cell(p)));
            if show_gem {
                header.push(header_cell("Hidden Gem"));
            }
            let mut table = styled_table(header);
            for record in &view.records {
                let mut row = vec![Cell::new(&record.title)];
                row.extend(
                    properties
                        .iter()
                        .map(|p| Cell::new(property_value(record, p).unwrap_or_default())),
                );
                if show_gem {
                    row.push(Cell::new(format!("{:.2}", hidden_gem_factor(record))));
                }
                table.add_row(row);
            }
            println!("{}", table);
            println!(
                "{}",
                format!(
                    "{} of {} titles, {} watched in total",
                    view.records.len(),
                    records.len(),
                    if view.metrics.totals.total_watch_time.is_empty() {
                        "nothing"
                    } else {
                        view.metrics.totals.total_watch_time.as_str()
                    }
                )
                .bright_black()
            );
        }
    } else {
        let value = serde_json::to_value(&view.records).wrap_err("Failed to serialize records")?;
        output.json(&json!({
            "type": "list",
            "filter": serde_json::to_value(&state.filter).wrap_err("Failed to serialize filter")?,
            "count": view.records.len(),
            "records": value,
        }));
    }

    report_skipped(view.skipped.len(), "the list", output);
    Ok(())
}

fn print_facets(records: &[Record], output: &Output) -> Result<()> {
    let available = facets(records);
    let catalog = property_catalog(records);

    if !output.is_human() {
        output.json(&json!({
            "type": "facets",
            "facets": serde_json::to_value(&available).wrap_err("Failed to serialize facets")?,
            "properties": catalog,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let types: Vec<String> = available.types.iter().map(|t| t.to_string()).collect();
    let mut table = styled_table(vec![header_cell("Filter"), header_cell("Values")]);
    table.add_row(vec![Cell::new("Genres"), Cell::new(available.genres.join(", "))]);
    table.add_row(vec![Cell::new("Types"), Cell::new(types.join(", "))]);
    table.add_row(vec![Cell::new("Languages"), Cell::new(available.languages.join(", "))]);
    table.add_row(vec![Cell::new("Providers"), Cell::new(available.providers.join(", "))]);
    table.add_row(vec![Cell::new("Properties"), Cell::new(catalog.join(", "))]);
    println!("{}", table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_shelf_core::SortDirection;

    fn options() -> ListOptions {
        ListOptions {
            search: None,
            genres: Vec::new(),
            all_genres: false,
            types: Vec::new(),
            min_rating: None,
            watchlist: false,
            languages: Vec::new(),
            providers: Vec::new(),
            sort: SortKey::Rating,
            ascending: false,
            properties: Vec::new(),
            facets: false,
        }
    }

    #[test]
    fn test_repeated_flags_do_not_toggle_off() {
        let opts = ListOptions {
            genres: vec!["Drama".to_string(), "Drama".to_string()],
            types: vec![MediaType::Movie, MediaType::Movie],
            ..options()
        };
        let state = ViewState::default().apply_all(list_events(&opts));
        assert_eq!(state.filter.genres, vec!["Drama".to_string()]);
        assert_eq!(state.filter.types, vec![MediaType::Movie]);
    }

    #[test]
    fn test_flags_map_to_state() {
        let opts = ListOptions {
            search: Some("heat".to_string()),
            all_genres: true,
            min_rating: Some(3.5),
            watchlist: true,
            providers: vec!["Netflix".to_string()],
            sort: SortKey::HiddenGem,
            ascending: true,
            ..options()
        };
        let state = ViewState::default().apply_all(list_events(&opts));
        assert_eq!(state.filter.search, "heat");
        assert_eq!(state.filter.genre_operator, GenreOperator::And);
        assert_eq!(state.filter.min_rating, 3.5);
        assert!(state.filter.watchlist_only);
        assert_eq!(state.filter.providers, vec!["Netflix".to_string()]);
        assert_eq!(state.sort.key, SortKey::HiddenGem);
        assert_eq!(state.sort.direction, SortDirection::Ascending);
    }
}
