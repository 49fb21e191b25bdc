//! Color utilities for CLI output
//!
//! Consistent styling for container states and runner log levels.

use console::{Style, StyledObject};

/// Style a container state string with appropriate colors
///
/// - "running" -> green bold
/// - "exited", "dead" -> red
/// - "created", "restarting" -> yellow
/// - other (including absent) -> dim
pub fn state_style(state: &str) -> StyledObject<String> {
    let lowercase = state.to_lowercase();
    let style = match lowercase.as_str() {
        "running" => Style::new().green().bold(),
        "exited" | "dead" => Style::new().red(),
        "created" | "restarting" | "paused" => Style::new().yellow(),
        _ => Style::new().dim(),
    };
    style.apply_to(state.to_string())
}

/// Style a log line based on detected log level
pub fn log_level_style(line: &str) -> StyledObject<&str> {
    let style = if line.contains("ERROR") || line.contains("error") {
        Style::new().red()
    } else if line.contains("WARN") || line.contains("warn") {
        Style::new().yellow()
    } else if line.contains("INFO") || line.contains("info") {
        Style::new().cyan()
    } else if line.contains("DEBUG") || line.contains("debug") {
        Style::new().dim()
    } else {
        Style::new()
    };
    style.apply_to(line)
}
