//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation.

use std::path::Path;

use crate::config::TandemConfig;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    /// Validate a loaded configuration
    fn validate(&self, config: &TandemConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use tandem_config::{ConfigValidator, SchemaValidator, TandemConfig};
///
/// SchemaValidator.validate(&TandemConfig::default()).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &TandemConfig) -> Result<()> {
        non_empty_command("client.command", &config.client.command)?;
        non_empty_command("server.command", &config.server.command)?;
        non_empty_command("server.runtime", &config.server.runtime)?;

        if config.restart_delay_ms == 0 {
            return Err(invalid(
                "restart_delay_ms",
                "Use a positive delay so a crashing server cannot restart in a tight loop",
            ));
        }

        if config.server.watch.is_empty() {
            return Err(invalid(
                "server.watch",
                "List at least one server source directory",
            ));
        }

        if config.server.entry.as_os_str().is_empty() {
            return Err(invalid("server.entry", "Name the compiled server bundle, e.g. server.js"));
        }

        if config.build_dir.as_os_str().is_empty() || config.build_dir == Path::new("/") {
            return Err(invalid(
                "build_dir",
                "The build directory is deleted on startup; point it at a dedicated folder",
            ));
        }

        Ok(())
    }
}

fn non_empty_command(field: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(invalid(field, "Provide the program followed by its arguments")),
    }
}

fn invalid(field: &str, hint: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        hint: hint.to_string(),
    }
}

/// Filesystem validator (for CLI use)
///
/// Checks that both bundler configs and the server watch paths exist. Expects
/// an absolutized configuration.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &TandemConfig) -> Result<()> {
        // First run schema validation
        SchemaValidator.validate(config)?;

        if !config.client.config.is_file() {
            return Err(ConfigError::BundlerConfigNotFound {
                target: "client",
                path: config.client.config.clone(),
            });
        }
        if !config.server.config.is_file() {
            return Err(ConfigError::BundlerConfigNotFound {
                target: "server",
                path: config.server.config.clone(),
            });
        }

        for path in &config.server.watch {
            if !path.exists() {
                return Err(ConfigError::WatchPathNotFound(path.clone()));
            }
        }

        Ok(())
    }
}
