//! Progress reporting for Docker builds
//!
//! Spinner-based feedback for the image build, with a plain-output fallback
//! for non-interactive terminals (CI logs keep every line).

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Progress reporter for long-running Docker operations.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
    plain: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// Create a reporter; falls back to plain output when stderr is not a
    /// terminal.
    pub fn new() -> Self {
        Self::with_plain_output(!console::user_attended_stderr())
    }

    /// Create a reporter that only emits plain lines (quiet/CI mode).
    pub fn plain() -> Self {
        Self::with_plain_output(true)
    }

    fn with_plain_output(plain: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: HashMap::new(),
            plain,
        }
    }

    /// Whether output is line-based instead of animated.
    pub fn is_plain_output(&self) -> bool {
        self.plain
    }

    /// Create a spinner for indeterminate progress (e.g. build steps).
    pub fn add_spinner(&mut self, id: &str, message: &str) {
        if self.plain {
            eprintln!("{message}");
            return;
        }
        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("valid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        self.bars.insert(id.to_string(), spinner);
    }

    /// Update a spinner's message, creating it on first use.
    pub fn update_spinner(&mut self, id: &str, message: &str) {
        if self.plain {
            eprintln!("{message}");
            return;
        }
        match self.bars.get(id) {
            Some(spinner) => spinner.set_message(message.to_string()),
            None => self.add_spinner(id, message),
        }
    }

    /// Mark one spinner as complete.
    pub fn finish(&mut self, id: &str, message: &str) {
        if self.plain {
            eprintln!("{message}");
            return;
        }
        if let Some(bar) = self.bars.get(id) {
            bar.finish_with_message(message.to_string());
        }
    }

    /// Mark everything as failed.
    pub fn abandon_all(&self, message: &str) {
        if self.plain {
            eprintln!("{message}");
            return;
        }
        for bar in self.bars.values() {
            bar.abandon_with_message(message.to_string());
        }
    }
}
