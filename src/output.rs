use std::cmp::max;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use terminal_size::{Width as TermWidth, terminal_size};

/// Print a single result object as indented JSON
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Column width for free-text table cells, derived from the terminal
pub fn text_column_width() -> usize {
    match terminal_size() {
        // For very wide terminals, don't use the full width
        Some((TermWidth(w), _)) if w > 160 => 60,
        Some((TermWidth(w), _)) => max(24, (w as usize).saturating_sub(60) / 2),
        None => 40, // Default width if terminal size can't be determined
    }
}

/// Truncate a table cell to the column width, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Format an RFC 3339 timestamp as a relative age for list output
pub fn relative_age(timestamp: &str) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };

    let diff = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));

    if diff.num_days() > 0 {
        format!("{} days ago", diff.num_days())
    } else if diff.num_hours() > 0 {
        format!("{} hours ago", diff.num_hours())
    } else if diff.num_minutes() > 0 {
        format!("{} minutes ago", diff.num_minutes())
    } else {
        "just now".to_string()
    }
}
