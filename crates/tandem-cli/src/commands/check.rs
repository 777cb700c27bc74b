//! Check command implementation.
//!
//! Validates configuration and environment without starting a session.

use crate::cli::CheckArgs;
use crate::commands::Project;
use crate::error::{CliError, ConfigError, Result};
use crate::ui;
use tandem_config::TandemConfig;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load and validate `tandem.toml`
/// 2. Check bundler configs and server sources exist
/// 3. Read `.env` and derive the build definitions
/// 4. Print the resolved settings
///
/// With `--schema` only the JSON schema of `tandem.toml` is printed.
///
/// # Errors
///
/// Returns errors for invalid configuration, missing files and malformed
/// environment values. A missing `.env` is reported as a warning.
pub async fn execute(args: CheckArgs) -> Result<()> {
    if args.schema {
        let schema = serde_json::to_string_pretty(&TandemConfig::json_schema())?;
        println!("{}", schema);
        return Ok(());
    }

    ui::info("Checking configuration...");
    let project = Project::load(args.cwd.as_deref(), args.config.as_deref())?;
    project.validate()?;
    ui::success("Configuration is valid");

    let config = &project.config;
    let mut settings = vec![
        (
            "config file".to_string(),
            project
                .config_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string()),
        ),
        ("build_dir".to_string(), config.build_dir.display().to_string()),
        ("client config".to_string(), config.client.config.display().to_string()),
        ("server config".to_string(), config.server.config.display().to_string()),
        (
            "server entry".to_string(),
            config.server_entry().display().to_string(),
        ),
        ("restart delay".to_string(), format!("{}ms", config.restart_delay_ms)),
    ];

    match project.env(None) {
        Ok(env) => {
            settings.push((
                "dev server".to_string(),
                format!("{}:{}", config.dev_server.bind, env.dev_port),
            ));
            settings.push(("public path".to_string(), env.public_path()));
            ui::success("Environment is valid");
        }
        Err(CliError::Config(ConfigError::EnvFileMissing(path))) => {
            ui::warning(&format!("No {} file found; `tandem dev` will not start", path.display()));
        }
        Err(e) => return Err(e),
    }

    ui::print_settings(&settings);
    Ok(())
}
