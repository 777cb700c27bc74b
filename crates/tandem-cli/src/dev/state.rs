//! Shared state for the development server.
//!
//! The dev server reads the outcome of the last client compile to decide
//! between the error overlay and the bundle; the client build controller
//! writes it. Browsers subscribed to live reload each own a bounded queue of
//! [`DevEvent`]s.

use crate::dev::DevEvent;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::mpsc;

/// Events a browser may fall behind by before it is disconnected.
const BROWSER_QUEUE: usize = 64;

/// Client compile status as seen by the dev server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// No compile has been performed yet
    NotStarted,
    /// A compile is currently in progress
    InProgress { started_at: Instant },
    /// Last compile produced no errors
    Success { duration_ms: u64, warnings: usize },
    /// Last compile failed
    Failed { errors: Vec<String> },
}

impl BuildStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    /// Error messages if the last compile failed.
    pub fn errors(&self) -> Option<&[String]> {
        match self {
            BuildStatus::Failed { errors } => Some(errors),
            _ => None,
        }
    }
}

/// Browsers subscribed to live reload.
#[derive(Debug, Default)]
struct Browsers {
    next_id: AtomicUsize,
    queues: Mutex<Vec<(usize, mpsc::Sender<DevEvent>)>>,
}

impl Browsers {
    fn subscribe(&self) -> (usize, mpsc::Receiver<DevEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(BROWSER_QUEUE);
        self.queues.lock().push((id, tx));
        (id, rx)
    }

    fn unsubscribe(&self, id: usize) {
        self.queues.lock().retain(|(queued, _)| *queued != id);
    }

    /// Queue `event` for every browser, dropping those that are gone or
    /// stopped reading. The reload client reconnects on its own.
    fn send(&self, event: &DevEvent) {
        self.queues.lock().retain(|(id, tx)| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("dropping browser {}: {}", id, e);
                false
            }
        });
    }

    fn len(&self) -> usize {
        self.queues.lock().len()
    }
}

/// State shared between the dev server and the client build controller.
#[derive(Debug)]
pub struct DevServerState {
    status: RwLock<BuildStatus>,
    browsers: Browsers,
    public_dir: PathBuf,
}

impl DevServerState {
    pub fn new(public_dir: PathBuf) -> Self {
        Self {
            status: RwLock::new(BuildStatus::NotStarted),
            browsers: Browsers::default(),
            public_dir,
        }
    }

    pub fn start_build(&self) {
        *self.status.write() = BuildStatus::InProgress {
            started_at: Instant::now(),
        };
    }

    /// Record a compile without errors. Returns the elapsed time.
    pub fn complete_build(&self, warnings: usize) -> u64 {
        let mut status = self.status.write();
        let duration_ms = match &*status {
            BuildStatus::InProgress { started_at } => started_at.elapsed().as_millis() as u64,
            _ => 0,
        };
        *status = BuildStatus::Success {
            duration_ms,
            warnings,
        };
        duration_ms
    }

    pub fn fail_build(&self, errors: Vec<String>) {
        *self.status.write() = BuildStatus::Failed { errors };
    }

    pub fn status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    /// Subscribe a browser to reload events.
    pub fn subscribe(&self) -> (usize, mpsc::Receiver<DevEvent>) {
        self.browsers.subscribe()
    }

    pub fn unsubscribe(&self, id: usize) {
        self.browsers.unsubscribe(id);
    }

    pub fn notify_browsers(&self, event: &DevEvent) {
        self.browsers.send(event);
    }

    pub fn browser_count(&self) -> usize {
        self.browsers.len()
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }
}

pub type SharedState = Arc<DevServerState>;
