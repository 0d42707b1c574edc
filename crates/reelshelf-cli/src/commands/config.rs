use super::{header_cell, load_config, prompts, styled_table};
use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use comfy_table::Cell;
use media_shelf_config::{Config, MetricsConfig};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn run_config(cmd: crate::ConfigCommands, config_path: &Path, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show => show_config(config_path, output),
        crate::ConfigCommands::Init { force } => init_config(config_path, force, output),
        crate::ConfigCommands::Path => {
            if output.is_human() {
                println!("{}", config_path.display());
            } else {
                output.json(&json!({ "type": "config_path", "path": config_path.display().to_string() }));
            }
            Ok(())
        }
    }
}

fn metrics_rows(metrics: &MetricsConfig) -> Vec<(&'static str, String)> {
    vec![
        ("Top genres", metrics.top_genres.to_string()),
        ("Top actors", metrics.top_actors.to_string()),
        ("Top directors", metrics.top_directors.to_string()),
        ("Top production companies", metrics.top_production_companies.to_string()),
        ("Top collections", metrics.top_collections.to_string()),
        ("Top years", metrics.top_years.to_string()),
        ("Top budget entries", metrics.top_budget.to_string()),
        ("Min actor samples", metrics.min_actor_samples.to_string()),
        ("Min director samples", metrics.min_director_samples.to_string()),
        ("Min company samples", metrics.min_company_samples.to_string()),
        ("Min collection samples", metrics.min_collection_samples.to_string()),
        ("Min year samples", metrics.min_year_samples.to_string()),
        ("Blockbuster threshold", metrics.blockbuster_threshold.to_string()),
        ("Max movies per collection", metrics.max_movies_from_collection.to_string()),
    ]
}

fn show_config(config_path: &Path, output: &Output) -> Result<()> {
    let exists = config_path.exists();
    let config = load_config(config_path)?;

    if !output.is_human() {
        let value = serde_json::to_value(&config).wrap_err("Failed to serialize config")?;
        output.json(&json!({
            "type": "config",
            "path": config_path.display().to_string(),
            "exists": exists,
            "config": value,
        }));
        return Ok(());
    }

    if !exists {
        output.warn(format!("Configuration file not found at: {}", config_path.display()));
        output.info("Showing defaults. Run 'reelshelf config init' to write them to disk.");
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
    println!("{} {}", "║".bright_white(), "Configuration".bright_cyan().bold());
    println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
    println!();

    let mut info_table = styled_table(vec![
        Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(config_path.display().to_string()),
    ]);
    info_table.add_row(vec![
        Cell::new("Status"),
        Cell::new(if exists { "✓ loaded".green().to_string() } else { "defaults".yellow().to_string() }),
    ]);
    println!("{}", info_table);
    println!();

    let mut metrics_table = styled_table(vec![header_cell("Metrics"), header_cell("")]);
    for (name, value) in metrics_rows(&config.metrics) {
        metrics_table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("{}", metrics_table);
    println!();

    let library = &config.library;
    let list_or_none = |values: &[String]| {
        if values.is_empty() {
            "<none>".bright_black().to_string()
        } else {
            values.join(", ")
        }
    };
    let mut library_table = styled_table(vec![header_cell("Library"), header_cell("")]);
    library_table.add_row(vec![Cell::new("Notes folder"), Cell::new(&library.notes_folder)]);
    library_table.add_row(vec![
        Cell::new("Default languages"),
        Cell::new(list_or_none(library.default_language_filters.as_slice())),
    ]);
    library_table.add_row(vec![
        Cell::new("Default properties"),
        Cell::new(list_or_none(library.default_properties.as_slice())),
    ]);
    println!("{}", library_table);

    Ok(())
}

fn init_config(config_path: &Path, force: bool, output: &Output) -> Result<()> {
    if config_path.exists() && !force {
        let overwrite = prompts::prompt_yes_no(
            &format!("{} already exists. Overwrite it with defaults?", config_path.display()),
            Some(false),
            output,
        )?;
        if !overwrite {
            output.info("Configuration left unchanged.");
            return Ok(());
        }
    }

    write_defaults(config_path)?;
    output.success(format!("Wrote default configuration to {}", config_path.display()));
    Ok(())
}

fn write_defaults(config_path: &Path) -> Result<()> {
    Config::default()
        .save_to_file(config_path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", config_path.display(), e))
}
