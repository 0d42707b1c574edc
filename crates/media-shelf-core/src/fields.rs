// Coercion helpers for loosely typed frontmatter fields.
// All of these are total: malformed input degrades to empty / zero.

use regex::Regex;
use std::sync::OnceLock;

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid leading number regex")
    })
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*minutes").expect("valid duration regex"))
}

/// Split a comma-joined field ("Drama, Comedy") into trimmed tokens.
pub fn split_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the leading number of a field ("4.5", "7.1/10", "  3 ").
/// Returns `None` when the text does not start with a number.
pub fn parse_number(field: &str) -> Option<f64> {
    let found = leading_number_re().find(field.trim())?;
    found.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric coercion for ratings and votes; anything non-numeric is 0.
pub fn parse_rating(field: &str) -> f64 {
    parse_number(field).unwrap_or(0.0)
}

/// Extract the integer preceding the word "minutes" ("132 minutes" -> 132).
pub fn parse_duration_minutes(text: &str) -> u32 {
    duration_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Render minutes as "1d 2h 3m", leaving out zero units.
pub fn format_duration(total_minutes: u64) -> String {
    let days = total_minutes / (60 * 24);
    let hours = (total_minutes % (60 * 24)) / 60;
    let minutes = total_minutes % 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.join(" ")
}

// Half away from zero, so 4.5 -> 5 like the rest of the dashboard
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Render an amount in the largest applicable unit ("1.5Billion USD", "5K USD").
pub fn format_money(amount: f64) -> String {
    if amount >= 1e9 {
        format!("{:.1}Billion USD", round_to(amount / 1e9, 1))
    } else if amount >= 1e6 {
        format!("{:.1}Million USD", round_to(amount / 1e6, 1))
    } else if amount >= 1e3 {
        format!("{:.0}K USD", round_to(amount / 1e3, 0))
    } else {
        format!("{:.2}", round_to(amount, 2))
    }
}

/// Round a metric for display and comparison (averages use 2, taste index 3).
pub fn round_metric(value: f64, decimals: i32) -> f64 {
    round_to(value, decimals)
}
