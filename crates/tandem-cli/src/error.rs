//! Error handling for the Tandem CLI.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Each variant is meant to be actionable: messages end with a hint whenever
//! the user can do something about the failure.
//!
//! # Architecture
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`, `BuildError`) provide detailed context
//! - **Error conversion** is automatic via `#[from]` attributes
//!
//! # Example
//!
//! ```rust,no_run
//! use tandem_cli::error::{BuildError, Result};
//!
//! fn program(argv: &[String]) -> Result<&str> {
//!     let program = argv
//!         .first()
//!         .ok_or_else(|| BuildError::EmptyCommand("server runtime".to_string()))?;
//!     Ok(program)
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

pub use tandem_config::ConfigError;

/// Top-level CLI error type.
///
/// This is the primary error type returned by CLI commands. It automatically
/// converts from domain-specific errors via `From` implementations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration and environment errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bundler and process errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bundler and server process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A bundler or runtime command has no program
    #[error("No command configured for the {0}\n\nHint: Set the program and its arguments in tandem.toml")]
    EmptyCommand(String),

    /// A child process could not be started
    #[error("Failed to start '{program}': {source}\n\nHint: Check that the program is installed and on PATH")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// Bundler output could not be read as statistics
    #[error("Bundler output is not a statistics document: {0}\n\nHint: Make the bundler print JSON stats to stdout (webpack --json)")]
    InvalidStats(String),

    /// The build directory could not be removed during bootstrap
    #[error("Failed to remove build directory {}: {source}\n\nHint: Check directory permissions", .path.display())]
    CleanBuildDir {
        /// Build directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_empty_command() {
        let err = BuildError::EmptyCommand("server runtime".to_string());
        let msg = err.to_string();
        assert!(msg.contains("server runtime"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_build_error_spawn() {
        let err = BuildError::Spawn {
            program: "node".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to start 'node'"));
        assert!(msg.contains("PATH"));
    }

    #[test]
    fn test_build_error_clean_build_dir() {
        let err = BuildError::CleanBuildDir {
            path: PathBuf::from("build"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("build"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let config_err = ConfigError::NotFound(PathBuf::from("tandem.toml"));
        let cli_err: CliError = config_err.into();
        assert!(matches!(cli_err, CliError::Config(_)));
        assert!(cli_err.to_string().contains("tandem.toml"));
    }

    #[test]
    fn test_cli_error_from_build_error() {
        let build_err = BuildError::InvalidStats("expected value".to_string());
        let cli_err: CliError = build_err.into();
        assert!(matches!(cli_err, CliError::Build(_)));
    }
}
