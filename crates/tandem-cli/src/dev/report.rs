//! Terminal reporting of compile passes.

use owo_colors::OwoColorize;

use super::diagnostics::{BuildResult, BuildTarget, Outcome};
use crate::ui::{self, Spinner};

/// Prints the spinner and the outcome of each pass for one pipeline.
pub struct BuildReporter {
    target: BuildTarget,
    spinner: Option<Spinner>,
    clear_on_start: bool,
    interactive: bool,
}

impl BuildReporter {
    /// Reporter for `target`. The client pipeline clears the terminal at the
    /// start of every pass; the server pipeline only when its own sources
    /// changed.
    pub fn new(target: BuildTarget) -> Self {
        Self {
            target,
            spinner: None,
            clear_on_start: target == BuildTarget::Client,
            interactive: !ui::is_ci(),
        }
    }

    /// Reporter that never draws a spinner or clears the screen.
    pub fn plain(target: BuildTarget) -> Self {
        Self {
            interactive: false,
            ..Self::new(target)
        }
    }

    /// A pass started.
    pub fn compile_started(&mut self) {
        if self.clear_on_start && self.interactive {
            ui::clear_console();
        }
        let message = format!("Compiling {}.", self.target);
        self.spinner = Some(if self.interactive {
            Spinner::new(&message)
        } else {
            Spinner::hidden(&message)
        });
    }

    /// A pass finished; prints the headline and the messages.
    pub fn compile_done(&mut self, result: &BuildResult) -> Outcome {
        let outcome = result.outcome();
        let headline = outcome.headline(self.target);
        let spinner = self
            .spinner
            .take()
            .unwrap_or_else(|| Spinner::hidden(&headline));

        match outcome {
            Outcome::Failed => {
                spinner.fail(&headline.red().to_string());
                if !self.interactive {
                    println!("{}", headline.red());
                }
                ui::print_messages(&result.errors);
            }
            Outcome::Warned => {
                spinner.finish(&headline.yellow().to_string());
                if !self.interactive {
                    println!("{}", headline.yellow());
                }
                ui::print_messages(&result.warnings);
            }
            Outcome::Succeeded => {
                spinner.finish(&headline.blue().to_string());
                if !self.interactive {
                    println!("{}", headline.blue());
                }
            }
        }

        outcome
    }

    /// Clear the terminal ahead of the next pass (server source changes).
    pub fn clear(&self) {
        if self.interactive {
            ui::clear_console();
        }
    }
}
