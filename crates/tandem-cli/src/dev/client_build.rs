//! Client build controller.
//!
//! Owns the client compiler and the dev server. The dev server is started
//! lazily by the first `ClientCompile` event and lives for the rest of the
//! session. Every finished pass updates the dev server state, notifies
//! connected browsers and, when the pass had no errors, asks for a server
//! compile.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use super::bus::{BusEvent, EventBus};
use super::compiler::{CompileQueue, Compiler, spawn_pass};
use super::diagnostics::BuildResult;
use super::report::BuildReporter;
use super::server::{DevServer, DevServerHandle, DevServerOptions};
use super::state::{DevServerState, SharedState};
use super::watcher::WatchSession;
use super::DevEvent;
use crate::error::Result;

/// Settings for the client pipeline.
#[derive(Debug, Clone)]
pub struct ClientBuildOptions {
    pub dev_server: DevServerOptions,
    pub public_dir: PathBuf,
    pub watch: Vec<PathBuf>,
    pub watch_ignore: Vec<String>,
    pub debounce_ms: u64,
    /// Draw spinners and clear the terminal
    pub interactive: bool,
}

pub struct ClientBuild {
    compiler: Arc<dyn Compiler>,
    bus: EventBus,
    reporter: BuildReporter,
    queue: CompileQueue,
    state: SharedState,
    dev_server_options: DevServerOptions,
    dev_server: Option<DevServerHandle>,
    _watch: WatchSession,
}

impl ClientBuild {
    /// Set up the client pipeline and its source watcher.
    ///
    /// Nothing is compiled and no port is bound until the first
    /// `ClientCompile` event.
    pub fn start(
        compiler: Arc<dyn Compiler>,
        options: ClientBuildOptions,
        bus: EventBus,
    ) -> Result<Self> {
        let target = compiler.target();
        let reporter = if options.interactive {
            BuildReporter::new(target)
        } else {
            BuildReporter::plain(target)
        };

        let watch = WatchSession::spawn(
            "client",
            &options.watch,
            options.watch_ignore.clone(),
            options.debounce_ms,
            bus.clone(),
            |_| Some(BusEvent::ClientCompile),
        )?;

        Ok(Self {
            compiler,
            bus,
            reporter,
            queue: CompileQueue::default(),
            state: Arc::new(DevServerState::new(options.public_dir)),
            dev_server_options: options.dev_server,
            dev_server: None,
            _watch: watch,
        })
    }

    /// Handle `ClientCompile`: make sure the dev server runs, then request a
    /// pass.
    pub async fn on_client_compile(&mut self) -> Result<()> {
        if self.dev_server.is_none() {
            let server = DevServer::new(self.dev_server_options.clone(), Arc::clone(&self.state));
            let handle = server.bind().await?;
            tracing::info!("dev server listening on http://{}", handle.addr());
            self.dev_server = Some(handle);
        }

        if self.queue.request() {
            self.begin_pass();
        } else {
            tracing::debug!("client compile requested during a pass; queued");
        }
        Ok(())
    }

    /// Handle `ClientCompiled`.
    pub fn on_compiled(&mut self, result: BuildResult) {
        self.reporter.compile_done(&result);

        if result.is_success() {
            let duration_ms = self.state.complete_build(result.warnings.len());
            self.state.notify_browsers(&DevEvent::BuildCompleted { duration_ms });
            self.bus.publish(BusEvent::ServerCompile {
                clear_terminal: false,
            });
        } else {
            self.state.notify_browsers(&DevEvent::BuildFailed {
                error: result.errors.join("\n\n"),
            });
            self.state.fail_build(result.errors);
        }

        if self.queue.finish() {
            self.begin_pass();
        }
    }

    fn begin_pass(&mut self) {
        self.reporter.compile_started();
        self.state.start_build();
        self.state.notify_browsers(&DevEvent::BuildStarted);
        spawn_pass(Arc::clone(&self.compiler), self.bus.clone());
    }

    /// Whether the dev server has been started.
    pub fn has_dev_server(&self) -> bool {
        self.dev_server.is_some()
    }

    /// Address of the running dev server.
    pub fn dev_server_addr(&self) -> Option<SocketAddr> {
        self.dev_server.as_ref().map(DevServerHandle::addr)
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn is_compiling(&self) -> bool {
        self.queue.is_in_flight()
    }
}
