//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert ConfigError to miette Report, attaching a hint where one helps.
fn config_error_to_miette(err: ConfigError) -> Report {
    let help = match &err {
        ConfigError::NotFound(_) => Some("Create tandem.toml or pass --config <path>".to_string()),
        ConfigError::Load(_) => Some("Run 'tandem check --schema' to see accepted keys".to_string()),
        ConfigError::BundlerConfigNotFound { target, .. } => {
            Some(format!("Set '{target}.config' in tandem.toml"))
        }
        ConfigError::WatchPathNotFound(_) => {
            Some("Create the directory or remove it from 'server.watch'".to_string())
        }
        ConfigError::MissingEnv(name) => Some(format!("Add {name}=<value> to .env")),
        ConfigError::InvalidEnv { name, .. } if name == "DEV_PORT" => {
            Some("DEV_PORT must be a port number between 1 and 65535".to_string())
        }
        _ => None,
    };

    match help {
        Some(help) => miette::miette!(help = help, "Configuration error: {}", err),
        None => miette::miette!("Configuration error: {}", err),
    }
}
