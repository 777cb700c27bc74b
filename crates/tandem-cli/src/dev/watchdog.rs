//! Config-change watchdog.
//!
//! Bundler configs are read once when the session starts, so a change to one
//! of them cannot be picked up by a rebuild. The watchdog reports the change
//! and the orchestrator ends the session.

use std::path::PathBuf;

use super::bus::{BusEvent, EventBus};
use super::watcher::{FileChange, WatchSession};
use crate::error::Result;

/// Printed (in yellow) before the session ends.
pub const CONFIG_CHANGED_NOTICE: &str =
    "* Webpack config changed. Please restart your development server.";

/// Watches the bundler configs and the tandem config file.
pub struct ConfigWatchdog {
    _session: WatchSession,
}

impl ConfigWatchdog {
    pub fn start(paths: &[PathBuf], debounce_ms: u64, bus: EventBus) -> Result<Self> {
        let session = WatchSession::spawn(
            "config",
            paths,
            Vec::new(),
            debounce_ms,
            bus,
            config_event,
        )?;
        Ok(Self { _session: session })
    }
}

/// Editors save either in place (modify) or by renaming a fresh file over the
/// old one (create); both count. Removal alone does not.
fn config_event(change: &FileChange) -> Option<BusEvent> {
    match change {
        FileChange::Modified(path) | FileChange::Created(path) => {
            Some(BusEvent::ConfigChanged(path.clone()))
        }
        FileChange::Removed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_and_create_are_changes() {
        let path = PathBuf::from("/app/scripts/config/webpack/client.js");
        assert_eq!(
            config_event(&FileChange::Modified(path.clone())),
            Some(BusEvent::ConfigChanged(path.clone()))
        );
        assert_eq!(
            config_event(&FileChange::Created(path.clone())),
            Some(BusEvent::ConfigChanged(path.clone()))
        );
        assert_eq!(config_event(&FileChange::Removed(path)), None);
    }
}
