//! Terminal UI utilities for build status and formatted output.
//!
//! Spinners and status lines follow the usual conventions of a watch-mode
//! bundler: the client pipeline clears the screen when a compile starts, a
//! spinner runs while the bundler works, and the finished compile is reported
//! as a colored headline followed by the formatted messages.
//!
//! # Examples
//!
//! ```no_run
//! use tandem_cli::ui;
//!
//! ui::init_colors();
//!
//! let spinner = ui::Spinner::new("Compiling client.");
//! spinner.finish("Successfully client compiled.");
//!
//! ui::warning("Server process exited with code 1.");
//! ```

mod format;
mod messages;
mod spinner;

pub use format::{clear_console, format_duration, print_messages, print_settings};
pub use messages::{error, info, notice, success, warning};
pub use spinner::Spinner;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment.
///
/// Should be called early in the application lifecycle (e.g., in main).
pub fn init_colors() {
    owo_colors::set_override(should_use_color());
}

/// Disable colors regardless of the environment (`--no-color`).
pub fn disable_colors() {
    owo_colors::set_override(false);
}
