//! File system watcher with debouncing for development mode.
//!
//! A [`FileWatcher`] covers a set of roots. Directory roots are watched
//! recursively and filtered by the ignore patterns; file roots are watched
//! through their parent directory and only report events for that exact file,
//! so editors that save by rename still count as a change.
//!
//! Events are dropped until every root has been registered. Past that point
//! each change is debounced per path.

use crate::dev::bus::{BusEvent, EventBus};
use crate::error::{CliError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

#[derive(Debug, Clone)]
enum WatchRoot {
    Dir(PathBuf),
    File(PathBuf),
}

impl WatchRoot {
    fn matches(&self, path: &Path, ignore_patterns: &[String]) -> bool {
        match self {
            WatchRoot::File(file) => path == file,
            WatchRoot::Dir(dir) => !FileWatcher::should_ignore(path, dir, ignore_patterns),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Only creations, modifications and removals count; access and other
    /// events are dropped before debouncing.
    fn from_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Created),
            EventKind::Modify(_) => Some(ChangeKind::Modified),
            EventKind::Remove(_) => Some(ChangeKind::Removed),
            _ => None,
        }
    }

    fn change(self, path: PathBuf) -> FileChange {
        match self {
            ChangeKind::Created => FileChange::Created(path),
            ChangeKind::Modified => FileChange::Modified(path),
            ChangeKind::Removed => FileChange::Removed(path),
        }
    }
}

/// Per-path debounce. Entries older than the window are pruned on every
/// accepted change, so the map only holds recently touched paths.
#[derive(Debug)]
struct Debounce {
    window: Duration,
    last: HashMap<PathBuf, Instant>,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
        }
    }

    /// Whether a change of `path` at `now` is outside the window.
    fn accept(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.last.get(path) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        }

        let window = self.window;
        self.last
            .retain(|_, seen| now.saturating_duration_since(*seen) < window);
        self.last.insert(path.to_path_buf(), now);
        true
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.last.len()
    }
}

/// File watcher with debouncing and filtering.
pub struct FileWatcher {
    /// Underlying notify watcher
    _watcher: RecommendedWatcher,
    /// Roots actually registered
    roots: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// Roots that do not exist are skipped with a warning.
    ///
    /// # Returns
    ///
    /// Tuple of (FileWatcher, receiver for change events)
    ///
    /// # Errors
    ///
    /// Returns error if the watcher cannot be created or a root cannot be
    /// registered.
    pub fn new(
        roots: &[PathBuf],
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(100);

        let watch_roots: Vec<WatchRoot> = roots
            .iter()
            .filter_map(|root| {
                // Backends report canonical paths (/private/var on macOS)
                let root = root.canonicalize().unwrap_or_else(|_| root.clone());
                if root.is_dir() {
                    Some(WatchRoot::Dir(root))
                } else if root.is_file() {
                    Some(WatchRoot::File(root))
                } else {
                    tracing::warn!("not watching {}: path does not exist", root.display());
                    None
                }
            })
            .collect();

        let ready = Arc::new(AtomicBool::new(false));
        let mut debounce = Debounce::new(Duration::from_millis(debounce_ms));
        let handler_roots = watch_roots.clone();
        let handler_ready = Arc::clone(&ready);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("watch error: {}", e);
                    return;
                }
            };

            if !handler_ready.load(Ordering::Acquire) {
                return;
            }

            // inotify reports Access(Open) ahead of every Modify; it must not
            // take the debounce slot of the write that follows
            let Some(kind) = ChangeKind::from_event(&event.kind) else {
                return;
            };

            for path in &event.paths {
                if !handler_roots
                    .iter()
                    .any(|root| root.matches(path, &ignore_patterns))
                {
                    continue;
                }

                if !debounce.accept(path, Instant::now()) {
                    continue;
                }

                let _ = tx.blocking_send(kind.change(path.clone()));
            }
        })
        .map_err(CliError::Watch)?;

        let mut registered = Vec::with_capacity(watch_roots.len());
        for root in &watch_roots {
            match root {
                WatchRoot::Dir(dir) => {
                    watcher
                        .watch(dir, RecursiveMode::Recursive)
                        .map_err(CliError::Watch)?;
                    registered.push(dir.clone());
                }
                WatchRoot::File(file) => {
                    let parent = file.parent().unwrap_or(Path::new("."));
                    watcher
                        .watch(parent, RecursiveMode::NonRecursive)
                        .map_err(CliError::Watch)?;
                    registered.push(file.clone());
                }
            }
        }

        ready.store(true, Ordering::Release);

        Ok((
            Self {
                _watcher: watcher,
                roots: registered,
            },
            rx,
        ))
    }

    /// Check if a path below `root` should be ignored.
    ///
    /// Paths outside `root`, hidden entries and entries matching an ignore
    /// pattern (`node_modules`, `*.log`, `*~`) are ignored.
    fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => return true,
        };

        let path_str = rel_path.to_string_lossy();

        for pattern in ignore_patterns {
            if let Some(suffix) = pattern.strip_prefix('*') {
                if path_str.ends_with(suffix) {
                    return true;
                }
            } else if rel_path
                .components()
                .any(|c| c.as_os_str().to_str() == Some(pattern.as_str()))
            {
                return true;
            }
        }

        // Ignore hidden files and directories
        for component in rel_path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if name.starts_with('.') && name != "." && name != ".." {
                    return true;
                }
            }
        }

        false
    }

    /// Roots registered with the OS watcher.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// A watcher whose changes are turned into bus events.
///
/// Dropping the session stops both the OS watcher and the forwarding task.
pub struct WatchSession {
    watcher: FileWatcher,
    forwarder: JoinHandle<()>,
}

impl WatchSession {
    /// Watch `roots` and publish `map(change)` for every change it accepts.
    pub fn spawn<F>(
        name: &'static str,
        roots: &[PathBuf],
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
        bus: EventBus,
        map: F,
    ) -> Result<Self>
    where
        F: Fn(&FileChange) -> Option<BusEvent> + Send + 'static,
    {
        let (watcher, mut rx) = FileWatcher::new(roots, ignore_patterns, debounce_ms)?;
        tracing::debug!("{} watcher ready on {:?}", name, watcher.roots());

        let forwarder = tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                tracing::debug!("{} change: {:?}", name, change);
                if let Some(event) = map(&change) {
                    bus.publish(event);
                }
            }
        });

        Ok(Self { watcher, forwarder })
    }

    pub fn roots(&self) -> &[PathBuf] {
        self.watcher.roots()
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_ignore_node_modules() {
        let root = PathBuf::from("/project");
        let patterns = vec!["node_modules".to_string()];

        let path = PathBuf::from("/project/node_modules/package/index.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));

        let path = PathBuf::from("/project/src/index.js");
        assert!(!FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_should_ignore_extension() {
        let root = PathBuf::from("/project");
        let patterns = vec!["*.log".to_string(), "*~".to_string()];

        assert!(FileWatcher::should_ignore(
            Path::new("/project/debug.log"),
            &root,
            &patterns
        ));
        assert!(FileWatcher::should_ignore(
            Path::new("/project/src/app.js~"),
            &root,
            &patterns
        ));
        assert!(!FileWatcher::should_ignore(
            Path::new("/project/src/index.js"),
            &root,
            &patterns
        ));
    }

    #[test]
    fn test_should_ignore_hidden_files() {
        let root = PathBuf::from("/project");
        let patterns = vec![];

        let path = PathBuf::from("/project/src/.hidden/file.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));

        let path = PathBuf::from("/project/.#index.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_should_ignore_outside_root() {
        let root = PathBuf::from("/project/src/server");
        let patterns = vec![];

        let path = PathBuf::from("/project/src/client/file.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_file_root_matches_exact_path_only() {
        let root = WatchRoot::File(PathBuf::from("/project/webpack/client.js"));
        assert!(root.matches(Path::new("/project/webpack/client.js"), &[]));
        assert!(!root.matches(Path::new("/project/webpack/server.js"), &[]));
    }

    #[test]
    fn test_missing_roots_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("src");
        std::fs::create_dir(&present).unwrap();

        let (watcher, _rx) =
            FileWatcher::new(&[present.clone(), dir.path().join("missing")], vec![], 50).unwrap();
        assert_eq!(watcher.roots(), &[present.canonicalize().unwrap()]);
    }

    #[test]
    fn test_access_events_are_not_changes() {
        use notify::event::{AccessKind, AccessMode, CreateKind, DataChange, ModifyKind, RemoveKind};

        assert_eq!(
            ChangeKind::from_event(&EventKind::Access(AccessKind::Open(AccessMode::Any))),
            None
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Access(AccessKind::Close(AccessMode::Write))),
            None
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Modify(ModifyKind::Data(DataChange::Any))),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Removed)
        );
    }

    #[test]
    fn test_debounce_window_per_path() {
        let mut debounce = Debounce::new(Duration::from_millis(100));
        let start = Instant::now();
        let a = Path::new("/project/src/a.js");
        let b = Path::new("/project/src/b.js");

        assert!(debounce.accept(a, start));
        assert!(!debounce.accept(a, start + Duration::from_millis(50)));
        assert!(debounce.accept(b, start + Duration::from_millis(50)));
        assert!(debounce.accept(a, start + Duration::from_millis(100)));
    }

    #[test]
    fn test_debounce_prunes_stale_paths() {
        let mut debounce = Debounce::new(Duration::from_millis(100));
        let start = Instant::now();

        for i in 0..10 {
            let path = PathBuf::from(format!("/project/src/{i}.js"));
            assert!(debounce.accept(&path, start));
        }
        assert_eq!(debounce.len(), 10);

        assert!(debounce.accept(Path::new("/project/src/late.js"), start + Duration::from_secs(1)));
        assert_eq!(debounce.len(), 1);
    }

    #[tokio::test]
    async fn test_in_place_write_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        let file = src.join("index.js");
        std::fs::write(&file, "one").unwrap();

        let (_watcher, mut rx) = FileWatcher::new(&[src.clone()], vec![], 50).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(&file, "two").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change, FileChange::Modified(file.canonicalize().unwrap()));
    }

    #[test]
    fn test_file_change_path() {
        let path = PathBuf::from("/project/src/index.js");

        let change = FileChange::Modified(path.clone());
        assert_eq!(change.path(), path.as_path());

        let change = FileChange::Removed(path.clone());
        assert_eq!(change.path(), path.as_path());
    }
}
