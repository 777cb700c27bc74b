//! Crash-restart policy for the server process.

use std::time::Duration;
use tokio::task::JoinHandle;

use super::bus::{BusEvent, EventBus};
use crate::ui::format_duration;

/// Whether an exit code calls for a restart: present and non-zero.
///
/// An absent code means the process was killed by a signal, which is how
/// tandem itself stops it.
pub fn should_restart(code: Option<i32>) -> bool {
    matches!(code, Some(code) if code != 0)
}

/// Warning printed when a crashed server is about to be restarted.
pub fn restart_notice(code: i32, delay: Duration) -> String {
    format!(
        "Server process exited with code {}. Process will restart after {}.",
        code,
        format_duration(delay)
    )
}

/// Single pending restart timer.
#[derive(Debug)]
pub struct RestartPolicy {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl RestartPolicy {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Publish `ServerRestart` after the delay. Returns `false` without
    /// scheduling anything when a timer is already pending.
    pub fn schedule(&mut self, bus: &EventBus) -> bool {
        if self.is_pending() {
            tracing::debug!("restart already scheduled");
            return false;
        }

        let bus = bus.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(BusEvent::ServerRestart);
        }));
        tracing::debug!("restart scheduled in {:?}", delay);
        true
    }

    /// A timer exists and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel the pending timer, if any.
    pub fn clear(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for RestartPolicy {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_only_on_nonzero_code() {
        assert!(should_restart(Some(1)));
        assert!(should_restart(Some(-1)));
        assert!(!should_restart(Some(0)));
        assert!(!should_restart(None));
    }

    #[test]
    fn notice_wording() {
        assert_eq!(
            restart_notice(1, Duration::from_millis(5000)),
            "Server process exited with code 1. Process will restart after 5s."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let (bus, mut rx) = EventBus::new();
        let mut policy = RestartPolicy::new(Duration::from_secs(5));

        assert!(policy.schedule(&bus));
        assert!(!policy.schedule(&bus));
        assert!(policy.is_pending());

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(rx.recv().await, Some(BusEvent::ServerRestart));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_timer() {
        let (bus, mut rx) = EventBus::new();
        let mut policy = RestartPolicy::new(Duration::from_secs(5));

        policy.schedule(&bus);
        policy.clear();
        assert!(!policy.is_pending());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
