//! Command spinner with quiet-mode suppression

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A spinner for one CLI operation.
///
/// In quiet mode (or when stderr is not a terminal) no spinner is drawn and
/// only the final success/failure line is printed.
pub struct CommandSpinner {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl CommandSpinner {
    /// Create a spinner unless quiet mode is active.
    pub fn new_maybe(message: &str, quiet: bool) -> Self {
        if quiet || !console::user_attended_stderr() {
            return Self { bar: None, quiet };
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar: Some(bar),
            quiet,
        }
    }

    /// Replace the spinner message.
    pub fn update(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Finish with a success line.
    pub fn success(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        if !self.quiet {
            eprintln!("{} {}", style("✓").green().bold(), message);
        }
    }

    /// Finish with a failure line.
    pub fn fail(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        eprintln!("{} {}", style("✗").red().bold(), message);
    }
}
