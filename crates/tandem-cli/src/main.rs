//! Tandem CLI entry point.
//!
//! Handles command-line argument parsing, logging initialization, and command
//! dispatch. Running `tandem` without a subcommand starts a dev session.

use clap::Parser;
use miette::Result;
use tandem_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = cli::Cli::parse();

    // Initialize logging and colors based on global flags
    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors();
    if args.no_color {
        ui::disable_colors();
    }

    // Execute the appropriate command
    let result = match args.command.unwrap_or_default() {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
    };

    // Convert CLI errors to miette diagnostics for error reporting
    result.map_err(error::cli_error_to_miette)
}
