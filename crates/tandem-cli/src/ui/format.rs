//! Formatting utilities for durations, message blocks and settings tables.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// Whole seconds print without decimals so restart notices read "5s".
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tandem_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(5)), "5s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        if total_ms % 1000 == 0 {
            format!("{}s", duration.as_secs())
        } else {
            format!("{:.2}s", duration.as_secs_f64())
        }
    } else {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// Print bundler messages to stdout, preceded by a blank line.
///
/// Messages are printed verbatim; they were already cleaned up by the
/// diagnostics formatter.
pub fn print_messages(messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    println!();
    for message in messages {
        println!("{}", message);
    }
}

/// Clear the terminal if stdout is attended.
pub fn clear_console() {
    let term = Term::stdout();
    if term.is_term() {
        let _ = term.clear_screen();
    }
}

/// Print a two-column table of resolved settings to stderr.
///
/// # Examples
///
/// ```no_run
/// use tandem_cli::ui::print_settings;
///
/// print_settings(&[
///     ("build_dir".to_string(), "/app/build".to_string()),
///     ("dev server".to_string(), "0.0.0.0:3001".to_string()),
/// ]);
/// ```
pub fn print_settings(entries: &[(String, String)]) {
    let term = Term::stderr();
    let width = (term.size().1 as usize).clamp(20, 80);
    let key_width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    eprintln!("\n{}", "Resolved Settings".bold().underline());
    eprintln!("{}", "─".repeat(width));

    for (key, value) in entries {
        eprintln!(
            "  {} {:<key_width$} {}",
            "▸".blue(),
            key.bright_white().bold(),
            value.dimmed(),
        );
    }

    eprintln!("{}", "─".repeat(width));
}
