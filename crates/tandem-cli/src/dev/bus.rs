//! Orchestration event bus.
//!
//! A closed set of events exchanged between the build controllers, the
//! supervisor and the watchers. Background tasks (compiler passes, process
//! waiters, restart timers, watchers) only ever talk back to the orchestrator
//! by publishing on the bus.

use std::path::PathBuf;
use tokio::sync::mpsc;

use super::diagnostics::BuildResult;

/// Events consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Request a client compile pass; the first one also starts the dev server
    ClientCompile,

    /// A client compile pass finished
    ClientCompiled(BuildResult),

    /// Request a server compile pass
    ServerCompile { clear_terminal: bool },

    /// A server compile pass finished
    ServerCompiled(BuildResult),

    /// Terminate the running server process, then run a fresh one
    ServerRestart,

    /// Spawn the server process
    ServerRun,

    /// The server process of `generation` failed (spawn or wait error)
    ServerError { generation: u64, message: String },

    /// The server process of `generation` exited on its own
    ServerExited { generation: u64, code: Option<i32> },

    /// A bundler or tandem config file changed
    ConfigChanged(PathBuf),
}

/// Sending half of the bus, cloned into every producer.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<BusEvent>,
}

impl EventBus {
    /// Create a bus and the receiver owned by the orchestrator.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish an event. Events published after shutdown are dropped.
    pub fn publish(&self, event: BusEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("bus closed, dropping {:?}", e.0);
        }
    }
}
