//! Spinner shown while a bundler runs.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Simple spinner for tasks without known duration.
///
/// # Examples
///
/// ```no_run
/// use tandem_cli::ui::Spinner;
///
/// let spinner = Spinner::new("Compiling server.");
/// // Do work...
/// spinner.finish("Successfully server compiled.");
/// ```
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a new spinner.
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒", "✓"]);
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Create a spinner that draws nothing (tests, `--quiet`).
    pub fn hidden(message: &str) -> Self {
        let pb = ProgressBar::hidden();
        pb.set_message(message.to_string());
        Self { pb }
    }

    /// Update spinner message while it's running.
    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Current message.
    pub fn message(&self) -> String {
        self.pb.message()
    }

    /// Finish spinner with success message.
    ///
    /// Displays a green checkmark.
    pub fn finish(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", "✓".green(), message));
    }

    /// Finish spinner with error message.
    ///
    /// Displays a red X.
    pub fn fail(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", "✗".red(), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_creation() {
        let spinner = Spinner::new("Compiling client.");
        spinner.set_message("Updated");
        spinner.finish("Done");
    }

    #[test]
    fn test_hidden_spinner_keeps_message() {
        let spinner = Spinner::hidden("Compiling server.");
        assert_eq!(spinner.message(), "Compiling server.");
        spinner.fail("Failed");
    }
}
