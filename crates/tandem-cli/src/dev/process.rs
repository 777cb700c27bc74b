//! Supervised server process.
//!
//! The orchestrator owns at most one [`ManagedProcess`]. A waiter task
//! observes the child and reports its exit on the bus, tagged with the
//! generation that spawned it so that late reports from an older process can
//! be told apart. A child killed through [`ManagedProcess::terminate`] reports
//! nothing.

use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::bus::{BusEvent, EventBus};
use super::command::CommandSpec;
use crate::error::{BuildError, Result};

/// Handle to a running server process.
#[derive(Debug)]
pub struct ManagedProcess {
    generation: u64,
    pid: Option<u32>,
    kill_tx: Option<oneshot::Sender<()>>,
    waiter: JoinHandle<()>,
}

impl ManagedProcess {
    /// Wrap a waiter task that kills its child when `kill_tx` fires.
    pub fn new(
        generation: u64,
        pid: Option<u32>,
        kill_tx: oneshot::Sender<()>,
        waiter: JoinHandle<()>,
    ) -> Self {
        Self {
            generation,
            pid,
            kill_tx: Some(kill_tx),
            waiter,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Kill the child and wait until it has been reaped.
    pub async fn terminate(mut self) {
        if let Some(kill_tx) = self.kill_tx.take() {
            let _ = kill_tx.send(());
        }
        if let Err(e) = (&mut self.waiter).await {
            tracing::warn!("server process waiter failed: {}", e);
        }
        tracing::debug!(
            "server process {} (pid {:?}) terminated",
            self.generation,
            self.pid
        );
    }
}

/// Spawns server processes.
pub trait ProcessLauncher: Send + Sync {
    /// Start generation `generation`, reporting its fate on `bus`.
    fn launch(&self, generation: u64, bus: &EventBus) -> Result<ManagedProcess>;
}

/// Launches the configured runtime with the compiled server entry.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    command: CommandSpec,
}

impl CommandLauncher {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }
}

impl ProcessLauncher for CommandLauncher {
    fn launch(&self, generation: u64, bus: &EventBus) -> Result<ManagedProcess> {
        let mut child = self
            .command
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BuildError::Spawn {
                program: self.command.program(),
                source,
            })?;

        let pid = child.id();
        tracing::debug!("spawned server process {} (pid {:?})", generation, pid);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr));
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let bus = bus.clone();
        let waiter = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => bus.publish(BusEvent::ServerExited {
                        generation,
                        code: status.code(),
                    }),
                    Err(e) => bus.publish(BusEvent::ServerError {
                        generation,
                        message: e.to_string(),
                    }),
                },
                // Fires on terminate() and when the handle is dropped
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!("failed to kill server process {}: {}", generation, e);
                    }
                }
            }
        });

        Ok(ManagedProcess::new(generation, pid, kill_tx, waiter))
    }
}

/// Echo a child's output line by line.
async fn forward_lines<R>(reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => println!("{}", line),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("server output closed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLauncher {
        CommandLauncher::new(
            CommandSpec::from_slice(
                "server runtime",
                &["sh".to_string(), "-c".to_string(), script.to_string()],
            )
            .unwrap(),
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reports_exit_code() {
        let (bus, mut rx) = EventBus::new();
        let process = sh("exit 3").launch(7, &bus).unwrap();
        assert_eq!(process.generation(), 7);

        assert_eq!(
            rx.recv().await,
            Some(BusEvent::ServerExited {
                generation: 7,
                code: Some(3)
            })
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn terminate_reports_nothing() {
        let (bus, mut rx) = EventBus::new();
        let process = sh("sleep 30").launch(1, &bus).unwrap();
        assert!(process.pid().is_some());

        process.terminate().await;
        drop(bus);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let (bus, _rx) = EventBus::new();
        let launcher = CommandLauncher::new(
            CommandSpec::from_slice(
                "server runtime",
                &["tandem-test-no-such-program".to_string()],
            )
            .unwrap(),
        );
        assert!(launcher.launch(1, &bus).is_err());
    }
}
