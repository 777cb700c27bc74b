//! Error types for configuration and environment loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config file errors
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    // Filesystem validation errors (for CLI use)
    #[error("bundler config not found for {target}: {}", .path.display())]
    BundlerConfigNotFound { target: &'static str, path: PathBuf },

    #[error("watch path does not exist: {}", .0.display())]
    WatchPathNotFound(PathBuf),

    // Environment errors
    #[error("environment file not found: {}", .0.display())]
    EnvFileMissing(PathBuf),

    #[error("failed to parse environment file: {0}")]
    EnvFile(String),

    #[error("missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for environment variable {name}: {value:?}")]
    InvalidEnv { name: String, value: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}
