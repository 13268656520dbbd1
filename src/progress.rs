//! Progress reporting for blocking update stages
//!
//! Scaffold generation and the merge can take a while. All progress goes
//! through [`ProgressReporter`] so the library can run silently under tests
//! and `--dry-run` while the binary shows a spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Receives stage updates from the update pipeline
pub trait ProgressReporter {
    /// A new stage started
    fn stage(&mut self, message: &str);

    /// The run finished successfully
    fn finish(&mut self);

    /// The run failed
    fn abandon(&mut self);
}

/// Spinner on stderr
pub struct SpinnerProgress {
    spinner: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for SpinnerProgress {
    fn stage(&mut self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    fn finish(&mut self) {
        self.spinner.finish_and_clear();
    }

    fn abandon(&mut self) {
        self.spinner.abandon();
    }
}

/// No-op reporter
#[derive(Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&mut self, _message: &str) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}
