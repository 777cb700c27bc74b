//! File changes on disk reaching the bus.
//!
//! Real watchers on real time: sources and config files are written in place
//! the way an editor saves them.

use async_trait::async_trait;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tandem_cli::dev::{
    BuildTarget, BusEvent, Collaborators, Compiler, ConfigWatchdog, DevConfig, EventBus,
    ExitReason, ManagedProcess, Orchestrator, ProcessLauncher, RawStats, WatchSession,
};
use tandem_cli::error::Result;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

/// Give the backend a moment to settle after registering.
const SETTLE: Duration = Duration::from_millis(200);
const WAIT: Duration = Duration::from_secs(5);

struct Project {
    temp: TempDir,
}

impl Project {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/server")).unwrap();
        fs::create_dir_all(root.join("src/client")).unwrap();
        fs::create_dir_all(root.join("webpack")).unwrap();
        fs::write(root.join("src/server/index.js"), "module.exports = 1;").unwrap();
        fs::write(root.join("webpack/client.js"), "module.exports = {};").unwrap();
        fs::write(root.join("webpack/server.js"), "module.exports = {};").unwrap();
        Self { temp }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }
}

async fn next_matching(
    rx: &mut UnboundedReceiver<BusEvent>,
    pred: impl Fn(&BusEvent) -> bool,
) -> BusEvent {
    tokio::time::timeout(WAIT, async {
        loop {
            let event = rx.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .unwrap()
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap()
}

#[tokio::test]
async fn test_server_source_edit_requests_clearing_compile() {
    let project = Project::new();
    let (bus, mut rx) = EventBus::new();

    let _session = WatchSession::spawn(
        "server",
        &[project.path("src/server")],
        vec!["node_modules".to_string()],
        50,
        bus,
        |_| {
            Some(BusEvent::ServerCompile {
                clear_terminal: true,
            })
        },
    )
    .unwrap();
    tokio::time::sleep(SETTLE).await;

    fs::write(project.path("src/server/index.js"), "module.exports = 2;").unwrap();

    let event = next_matching(&mut rx, |_| true).await;
    assert_eq!(
        event,
        BusEvent::ServerCompile {
            clear_terminal: true
        }
    );
}

#[tokio::test]
async fn test_bundler_config_edit_is_reported() {
    let project = Project::new();
    let (bus, mut rx) = EventBus::new();
    let client_config = project.path("webpack/client.js");

    let _watchdog = ConfigWatchdog::start(
        &[client_config.clone(), project.path("webpack/server.js")],
        50,
        bus,
    )
    .unwrap();
    tokio::time::sleep(SETTLE).await;

    fs::write(&client_config, "module.exports = { mode: 'development' };").unwrap();

    let event = next_matching(&mut rx, |_| true).await;
    assert_eq!(event, BusEvent::ConfigChanged(canonical(&client_config)));
}

#[tokio::test]
async fn test_sibling_of_config_file_is_ignored() {
    let project = Project::new();
    let (bus, mut rx) = EventBus::new();

    let _watchdog = ConfigWatchdog::start(&[project.path("webpack/client.js")], 50, bus).unwrap();
    tokio::time::sleep(SETTLE).await;

    fs::write(project.path("webpack/notes.txt"), "unrelated").unwrap();

    let quiet = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
    assert!(quiet.is_err(), "unexpected event: {quiet:?}");
}

struct Succeeding(BuildTarget);

#[async_trait]
impl Compiler for Succeeding {
    fn target(&self) -> BuildTarget {
        self.0
    }

    async fn run(&self) -> Result<RawStats> {
        Ok(RawStats::default())
    }
}

struct Idle;

impl ProcessLauncher for Idle {
    fn launch(&self, generation: u64, _bus: &EventBus) -> Result<ManagedProcess> {
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let waiter = tokio::spawn(async move {
            let _ = kill_rx.await;
        });
        Ok(ManagedProcess::new(generation, None, kill_tx, waiter))
    }
}

#[tokio::test]
async fn test_config_edit_ends_running_session() {
    let project = Project::new();
    let root = project.temp.path().to_path_buf();
    let client_config = project.path("webpack/client.js");

    let config = DevConfig {
        build_dir: root.join("build"),
        config_files: vec![client_config.clone(), project.path("webpack/server.js")],
        client_watch: vec![root.join("src/client")],
        server_watch: vec![root.join("src/server")],
        watch_ignore: vec!["node_modules".to_string()],
        debounce_ms: 50,
        restart_delay: Duration::from_secs(5),
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        host: "localhost".to_string(),
        public_dir: root.join("build"),
        history_fallback: true,
        interactive: false,
        root,
    };
    let parts = Collaborators {
        client_compiler: Arc::new(Succeeding(BuildTarget::Client)),
        server_compiler: Arc::new(Succeeding(BuildTarget::Server)),
        launcher: Arc::new(Idle),
    };

    let orchestrator = Orchestrator::bootstrap(&config, parts).unwrap();
    let session = tokio::spawn(orchestrator.run());
    tokio::time::sleep(SETTLE).await;

    fs::write(&client_config, "module.exports = { devtool: false };").unwrap();

    let reason = tokio::time::timeout(WAIT, session)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(reason, ExitReason::ConfigChanged(canonical(&client_config)));
    assert_eq!(reason.exit_code(), 0);
}
