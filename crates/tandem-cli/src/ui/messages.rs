//! Status message functions for terminal output.

use owo_colors::OwoColorize;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print a yellow notice followed by a blank line to stdout.
///
/// Used for session-level announcements that share the terminal with the
/// server process output (crash restarts, config changes).
///
/// # Examples
///
/// ```no_run
/// use tandem_cli::ui::notice;
///
/// notice("Server process exited with code 1. Process will restart after 5s.");
/// ```
pub fn notice(message: &str) {
    println!("{}", message.yellow());
    println!();
}
