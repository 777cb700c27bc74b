//! Development session.
//!
//! - Client and server bundle pipelines driven by an event bus
//! - Supervised server process with crash restarts
//! - Source watchers with debouncing
//! - Dev server with live reload via Server-Sent Events and an error overlay
//! - Config watchdog ending the session when a bundler config changes

pub mod bus;
pub mod client_build;
pub mod command;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error_overlay;
pub mod orchestrator;
pub mod process;
pub mod report;
pub mod restart;
pub mod server;
pub mod server_build;
pub mod state;
pub mod watchdog;
pub mod watcher;

// Re-exports
pub use bus::{BusEvent, EventBus};
pub use client_build::{ClientBuild, ClientBuildOptions};
pub use command::CommandSpec;
pub use compiler::{CommandCompiler, CompileQueue, Compiler};
pub use config::{DevConfig, command_collaborators};
pub use diagnostics::{BuildResult, BuildTarget, Outcome, RawMessage, RawStats, format_messages};
pub use orchestrator::{Collaborators, ExitReason, Orchestrator};
pub use process::{CommandLauncher, ManagedProcess, ProcessLauncher};
pub use restart::RestartPolicy;
pub use server::{DevServer, DevServerHandle, DevServerOptions};
pub use server_build::{ServerBuild, ServerBuildOptions, ServerPhase};
pub use state::{BuildStatus, DevServerState, SharedState};
pub use watchdog::ConfigWatchdog;
pub use watcher::{FileChange, FileWatcher, WatchSession};

use serde::{Deserialize, Serialize};

/// Events pushed to browsers over the live-reload channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// Client compile started
    BuildStarted,

    /// Client compile finished without errors
    BuildCompleted { duration_ms: u64 },

    /// Client compile failed
    BuildFailed { error: String },

    /// Browser connected
    ClientConnected { id: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_event_wire_format() {
        let json = serde_json::to_value(DevEvent::BuildCompleted { duration_ms: 12 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "BuildCompleted", "duration_ms": 12 })
        );
    }
}
