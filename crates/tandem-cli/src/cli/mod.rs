//! Command-line interface definition for Tandem.
//!
//! This module defines the CLI structure using clap v4's derive macros.
//!
//! # Command Structure
//!
//! - `tandem dev` - Run the development session (default)
//! - `tandem check` - Validate configuration and environment

mod commands;
mod tests;

use clap::Parser;

pub use commands::{CheckArgs, Command, DevArgs};

/// Tandem - client/server bundle orchestration for server-rendered apps
#[derive(Parser, Debug)]
#[command(
    name = "tandem",
    version,
    about = "Development orchestrator for server-rendered single-page applications",
    long_about = "Tandem builds the client and server bundles of a server-rendered app side by side.\n\
                  The client bundle is served by a hot-reloading development server; the server\n\
                  bundle runs as a supervised process that restarts after rebuilds and crashes."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows process lifecycle details: spawns, kills, coalesced compile
    /// requests and restart scheduling.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// Outputs plain text without ANSI color codes. Useful for logging to
    /// files or systems that don't support colored terminal output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute (defaults to `dev`)
    #[command(subcommand)]
    pub command: Option<Command>,
}
