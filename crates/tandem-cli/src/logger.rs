//! Logging infrastructure for the Tandem CLI.
//!
//! Structured logging via the `tracing` ecosystem. User-facing build output
//! goes through [`crate::ui`]; tracing carries the lifecycle details (process
//! spawns, kills, restart scheduling, coalesced compiles) that `--verbose`
//! reveals.
//!
//! # Verbosity
//!
//! 1. `--verbose`: DEBUG for tandem crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`: custom filter
//! 4. Default: INFO for tandem crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "tandem=debug,tandem_cli=debug,tandem_config=debug";
const QUIET_FILTER: &str = "tandem=error,tandem_cli=error,tandem_config=error";
const DEFAULT_FILTER: &str = "tandem=info,tandem_cli=info,tandem_config=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Should be called once at the start of the program, before any logging
/// occurs.
///
/// # Examples
///
/// ```rust,no_run
/// use tandem_cli::logger::init_logger;
///
/// // Default logging (INFO level)
/// init_logger(false, false, false);
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    // try_init: tests may build several sessions in one process
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// # Environment Variables
///
/// - `NO_COLOR`: If set, disables colors
/// - `FORCE_COLOR`: If set, forces colors even in non-TTY
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}
