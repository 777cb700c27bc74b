//! Development session command implementation.
//!
//! Resolves the project, freezes the environment, then hands control to the
//! orchestrator until a config file changes or the user presses Ctrl+C.

use crate::cli::DevArgs;
use crate::commands::Project;
use crate::dev::{DevConfig, Orchestrator, command_collaborators};
use crate::error::{CliError, ConfigError, Result};
use crate::ui;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Resolve the project root and load `tandem.toml`
/// 2. Read `.env`; without it the command ends successfully after a notice
/// 3. Check that bundler configs and server sources exist
/// 4. Bootstrap the orchestrator (deletes the build directory)
/// 5. Run until a config change or Ctrl+C
///
/// # Errors
///
/// Returns errors for invalid configuration, a missing or malformed
/// `DEV_PORT`, and failures while starting watchers or the dev server.
pub async fn execute(args: DevArgs) -> Result<()> {
    let project = Project::load(args.cwd.as_deref(), args.config.as_deref())?;

    let env = match project.env(args.port) {
        Ok(env) => env,
        Err(CliError::Config(ConfigError::EnvFileMissing(path))) => {
            ui::warning(&format!(
                "No {} file found. Create one with at least DEV_PORT set to start a session.",
                path.display()
            ));
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    project.validate()?;

    let dev = DevConfig::from_project(
        &project.root,
        &project.config,
        project.config_file.clone(),
        &env,
    );
    let parts = command_collaborators(&project.root, &project.config, &env)?;

    tracing::debug!("session config: {:?}", dev);
    ui::info(&format!("Starting development session in {}", dev.root.display()));
    ui::info(&format!("Dev server: {}", dev.server_url()));

    let orchestrator = Orchestrator::bootstrap(&dev, parts)?;
    let reason = orchestrator.run().await?;

    tracing::debug!("session ended: {:?} (exit code {})", reason, reason.exit_code());
    Ok(())
}
