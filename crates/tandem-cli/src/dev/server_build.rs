//! Server build controller and process supervisor.
//!
//! Cycle: `Idle -> Compiling -> Restarting -> Running`. A failed compile
//! leaves the current process (if any) alone. A crash (non-zero exit) moves
//! to `Crashed` and schedules a restart; a source change starts over at
//! `Compiling`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::bus::{BusEvent, EventBus};
use super::compiler::{CompileQueue, Compiler, spawn_pass};
use super::diagnostics::BuildResult;
use super::process::{ManagedProcess, ProcessLauncher};
use super::report::BuildReporter;
use super::restart::{RestartPolicy, restart_notice, should_restart};
use super::watcher::WatchSession;
use crate::error::Result;
use crate::ui;

/// Where the server pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Idle,
    Compiling,
    Restarting,
    Running,
    Crashed,
}

/// Settings for the server pipeline.
#[derive(Debug, Clone)]
pub struct ServerBuildOptions {
    pub watch: Vec<PathBuf>,
    pub watch_ignore: Vec<String>,
    pub debounce_ms: u64,
    pub restart_delay: Duration,
    /// Draw spinners and clear the terminal
    pub interactive: bool,
}

pub struct ServerBuild {
    compiler: Arc<dyn Compiler>,
    launcher: Arc<dyn ProcessLauncher>,
    bus: EventBus,
    reporter: BuildReporter,
    queue: CompileQueue,
    process: Option<ManagedProcess>,
    next_generation: u64,
    restart: RestartPolicy,
    phase: ServerPhase,
    _watch: WatchSession,
}

impl ServerBuild {
    /// Set up the server pipeline and its source watcher.
    pub fn start(
        compiler: Arc<dyn Compiler>,
        launcher: Arc<dyn ProcessLauncher>,
        options: ServerBuildOptions,
        bus: EventBus,
    ) -> Result<Self> {
        let target = compiler.target();
        let reporter = if options.interactive {
            BuildReporter::new(target)
        } else {
            BuildReporter::plain(target)
        };

        // Any add, change or removal below the server sources
        let watch = WatchSession::spawn(
            "server",
            &options.watch,
            options.watch_ignore.clone(),
            options.debounce_ms,
            bus.clone(),
            |_| {
                Some(BusEvent::ServerCompile {
                    clear_terminal: true,
                })
            },
        )?;

        Ok(Self {
            compiler,
            launcher,
            bus,
            reporter,
            queue: CompileQueue::default(),
            process: None,
            next_generation: 0,
            restart: RestartPolicy::new(options.restart_delay),
            phase: ServerPhase::Idle,
            _watch: watch,
        })
    }

    /// Handle `ServerCompile`.
    pub fn on_compile(&mut self, clear_terminal: bool) {
        if clear_terminal {
            self.reporter.clear();
        }

        if self.queue.request() {
            self.begin_pass();
        } else {
            tracing::debug!("server compile requested during a pass; queued");
        }
    }

    /// Handle `ServerCompiled`.
    pub fn on_compiled(&mut self, result: BuildResult) {
        self.reporter.compile_done(&result);

        if result.is_success() {
            self.phase = ServerPhase::Restarting;
            self.bus.publish(BusEvent::ServerRestart);
        } else {
            self.phase = self.resting_phase();
        }

        if self.queue.finish() {
            self.begin_pass();
        }
    }

    /// Handle `ServerRestart`: stop the current process, then ask for a new one.
    pub async fn on_restart(&mut self) {
        // A pending crash timer would only restart a second time
        self.restart.clear();
        self.stop_process().await;
        self.phase = ServerPhase::Restarting;
        self.bus.publish(BusEvent::ServerRun);
    }

    /// Handle `ServerRun`.
    pub async fn on_run(&mut self) {
        // Never two processes, even if ServerRun arrives twice in a row
        self.stop_process().await;

        self.next_generation += 1;
        match self.launcher.launch(self.next_generation, &self.bus) {
            Ok(process) => {
                self.process = Some(process);
                self.phase = ServerPhase::Running;
            }
            Err(e) => {
                ui::error(&e.to_string());
                println!();
                self.phase = ServerPhase::Idle;
            }
        }
    }

    /// Handle `ServerExited`.
    pub fn on_exited(&mut self, generation: u64, code: Option<i32>) {
        if !self.owns(generation) {
            tracing::debug!("ignoring exit of stale server process {}", generation);
            return;
        }
        self.process = None;

        match code {
            Some(code) if should_restart(Some(code)) => {
                ui::notice(&restart_notice(code, self.restart.delay()));
                self.restart.schedule(&self.bus);
                self.phase = ServerPhase::Crashed;
            }
            _ => {
                tracing::debug!("server process exited with {:?}", code);
                self.phase = ServerPhase::Idle;
            }
        }
    }

    /// Handle `ServerError`: printed, never restarted.
    pub fn on_error(&mut self, generation: u64, message: &str) {
        if !self.owns(generation) {
            tracing::debug!("ignoring error of stale server process {}", generation);
            return;
        }
        // The waiter is gone; dropping the handle kills whatever is left
        self.process = None;
        self.phase = ServerPhase::Idle;
        ui::error(message);
        println!();
    }

    /// Kill the live process and cancel any pending restart.
    pub async fn shutdown(&mut self) {
        self.restart.clear();
        self.stop_process().await;
        self.phase = ServerPhase::Idle;
    }

    fn begin_pass(&mut self) {
        self.phase = ServerPhase::Compiling;
        self.reporter.compile_started();
        spawn_pass(Arc::clone(&self.compiler), self.bus.clone());
    }

    async fn stop_process(&mut self) {
        if let Some(process) = self.process.take() {
            tracing::debug!("stopping server process {}", process.generation());
            process.terminate().await;
        }
    }

    fn owns(&self, generation: u64) -> bool {
        self.process
            .as_ref()
            .is_some_and(|p| p.generation() == generation)
    }

    fn resting_phase(&self) -> ServerPhase {
        if self.process.is_some() {
            ServerPhase::Running
        } else if self.restart.is_pending() {
            ServerPhase::Crashed
        } else {
            ServerPhase::Idle
        }
    }

    pub fn phase(&self) -> ServerPhase {
        self.phase
    }

    pub fn has_process(&self) -> bool {
        self.process.is_some()
    }

    /// Generation of the live process, if any.
    pub fn process_generation(&self) -> Option<u64> {
        self.process.as_ref().map(ManagedProcess::generation)
    }

    /// Number of processes launched so far.
    pub fn launches(&self) -> u64 {
        self.next_generation
    }

    pub fn restart_pending(&self) -> bool {
        self.restart.is_pending()
    }

    pub fn is_compiling(&self) -> bool {
        self.queue.is_in_flight()
    }
}
