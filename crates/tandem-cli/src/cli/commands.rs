use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available Tandem subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development session
    ///
    /// Deletes the previous build output, compiles the client bundle, starts
    /// the development server, then compiles and runs the server bundle.
    /// Sources are watched and rebuilt; a change to either bundler config
    /// ends the session.
    Dev(DevArgs),

    /// Validate configuration and environment
    ///
    /// Loads tandem.toml and .env, checks that bundler configs and watch
    /// paths exist, and prints the resolved settings.
    Check(CheckArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Dev(DevArgs::default())
    }
}

/// Arguments for the dev command
#[derive(Args, Debug, Default, Clone)]
pub struct DevArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Configuration file (defaults to tandem.toml in the project root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Development server port, overriding DEV_PORT
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
}

/// Arguments for the check command
#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Configuration file (defaults to tandem.toml in the project root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the JSON schema of tandem.toml and exit
    #[arg(long)]
    pub schema: bool,
}
