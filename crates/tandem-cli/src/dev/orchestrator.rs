//! Orchestration loop.
//!
//! A single task owns both controllers and handles bus events one at a time;
//! each handler finishes before the next event is taken. Everything that
//! runs concurrently (compiles, process waiters, restart timers, watchers,
//! the dev server) reports back by publishing on the bus.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use super::bus::{BusEvent, EventBus};
use super::client_build::ClientBuild;
use super::compiler::Compiler;
use super::config::DevConfig;
use super::process::ProcessLauncher;
use super::server_build::ServerBuild;
use super::watchdog::{CONFIG_CHANGED_NOTICE, ConfigWatchdog};
use crate::error::{BuildError, Result};
use crate::ui;

/// External collaborators of a session.
pub struct Collaborators {
    pub client_compiler: Arc<dyn Compiler>,
    pub server_compiler: Arc<dyn Compiler>,
    pub launcher: Arc<dyn ProcessLauncher>,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// A watched config file changed
    ConfigChanged(PathBuf),
    /// Ctrl+C
    Interrupted,
}

impl ExitReason {
    /// Process exit code for this reason.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitReason::ConfigChanged(_) | ExitReason::Interrupted => 0,
        }
    }
}

pub struct Orchestrator {
    bus: EventBus,
    events: UnboundedReceiver<BusEvent>,
    client: ClientBuild,
    server: ServerBuild,
    _watchdog: ConfigWatchdog,
}

impl Orchestrator {
    /// Start a session.
    ///
    /// Deletes the build directory before anything else runs, then starts
    /// the config watchdog and both controllers, and requests the first
    /// client compile.
    pub fn bootstrap(config: &DevConfig, parts: Collaborators) -> Result<Self> {
        clean_build_dir(&config.build_dir)?;

        let (bus, events) = EventBus::new();

        let watchdog = ConfigWatchdog::start(&config.config_files, config.debounce_ms, bus.clone())?;
        let client = ClientBuild::start(parts.client_compiler, config.client_options(), bus.clone())?;
        let server = ServerBuild::start(
            parts.server_compiler,
            parts.launcher,
            config.server_options(),
            bus.clone(),
        )?;

        bus.publish(BusEvent::ClientCompile);

        Ok(Self {
            bus,
            events,
            client,
            server,
            _watchdog: watchdog,
        })
    }

    /// Wait for the next bus event.
    pub async fn next_event(&mut self) -> Option<BusEvent> {
        self.events.recv().await
    }

    /// Handle one event. Returns the exit reason when the session should end.
    pub async fn dispatch(&mut self, event: BusEvent) -> Result<Option<ExitReason>> {
        tracing::debug!("event: {:?}", event);

        match event {
            BusEvent::ClientCompile => self.client.on_client_compile().await?,
            BusEvent::ClientCompiled(result) => self.client.on_compiled(result),
            BusEvent::ServerCompile { clear_terminal } => self.server.on_compile(clear_terminal),
            BusEvent::ServerCompiled(result) => self.server.on_compiled(result),
            BusEvent::ServerRestart => self.server.on_restart().await,
            BusEvent::ServerRun => self.server.on_run().await,
            BusEvent::ServerError {
                generation,
                message,
            } => self.server.on_error(generation, &message),
            BusEvent::ServerExited { generation, code } => self.server.on_exited(generation, code),
            BusEvent::ConfigChanged(path) => {
                tracing::debug!("config changed: {}", path.display());
                ui::notice(CONFIG_CHANGED_NOTICE);
                return Ok(Some(ExitReason::ConfigChanged(path)));
            }
        }

        Ok(None)
    }

    /// Run until a config change or Ctrl+C, then stop the server process.
    pub async fn run(mut self) -> Result<ExitReason> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let outcome = loop {
            tokio::select! {
                Some(event) = self.events.recv() => {
                    match self.dispatch(event).await {
                        Ok(Some(reason)) => break Ok(reason),
                        Ok(None) => {}
                        Err(e) => break Err(e),
                    }
                }
                _ = &mut ctrl_c => {
                    tracing::debug!("interrupted");
                    break Ok(ExitReason::Interrupted);
                }
            }
        };

        self.shutdown().await;
        outcome
    }

    /// Stop the server process and cancel pending restarts.
    pub async fn shutdown(&mut self) {
        self.server.shutdown().await;
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn client(&self) -> &ClientBuild {
        &self.client
    }

    pub fn server(&self) -> &ServerBuild {
        &self.server
    }
}

/// Delete the build directory. A missing directory is fine.
fn clean_build_dir(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!("removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::CleanBuildDir {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_zero() {
        assert_eq!(ExitReason::Interrupted.exit_code(), 0);
        assert_eq!(
            ExitReason::ConfigChanged(PathBuf::from("webpack/client.js")).exit_code(),
            0
        );
    }

    #[test]
    fn clean_build_dir_removes_tree_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");
        std::fs::create_dir_all(build.join("static")).unwrap();
        std::fs::write(build.join("server.js"), "").unwrap();

        clean_build_dir(&build).unwrap();
        assert!(!build.exists());
        clean_build_dir(&build).unwrap();
    }
}
