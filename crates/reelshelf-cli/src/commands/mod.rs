pub mod config;
pub mod discover;
pub mod list;
pub mod metrics;
pub mod prompts;

use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_shelf_config::Config;
use media_shelf_core::{load_records, Frontmatter, LoadReport};
use std::path::Path;

/// Load the configuration, falling back to defaults when the file does not exist.
/// A file that exists but is invalid is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
    }
    Config::load_or_default(path).map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))
}

/// Read a library snapshot and turn it into records, reporting skipped notes
/// and unreadable fields without failing.
pub fn load_library(path: &Path, output: &Output) -> Result<LoadReport> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read library snapshot {}", path.display()))?;
    let entries: Vec<Frontmatter> = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("{} is not a JSON array of frontmatter objects", path.display()))?;

    let report = load_records(&entries);
    tracing::info!(
        "Loaded {} records from {} ({} skipped, {} field warnings)",
        report.records.len(),
        path.display(),
        report.skipped.len(),
        report.warnings.len()
    );

    if !report.warnings.is_empty() {
        output.warn(format!(
            "{} field(s) could not be read and were treated as empty (run with -v for details)",
            report.warnings.len()
        ));
    }
    Ok(report)
}

pub fn styled_table(header: Vec<Cell>) -> Table {
    let mut table = Table::new();
    table.set_header(header);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)
}

pub fn report_skipped(count: usize, what: &str, output: &Output) {
    if count > 0 {
        output.warn(format!("{} record(s) skipped while computing {}", count, what));
    }
}
