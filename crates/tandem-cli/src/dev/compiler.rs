//! Compiler seam and compile-pass scheduling.
//!
//! A [`Compiler`] runs one pass and returns raw statistics. Passes run on
//! their own task and report back over the bus; [`CompileQueue`] keeps at most
//! one pass in flight per pipeline and folds requests that arrive meanwhile
//! into a single follow-up pass.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;

use super::bus::{BusEvent, EventBus};
use super::command::CommandSpec;
use super::diagnostics::{BuildTarget, RawStats, format_messages};
use crate::error::{BuildError, Result};

/// One bundler pipeline.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Pipeline this compiler builds.
    fn target(&self) -> BuildTarget;

    /// Run a single compile pass.
    async fn run(&self) -> Result<RawStats>;
}

/// Compiler backed by an external bundler command printing JSON stats.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    target: BuildTarget,
    command: CommandSpec,
}

impl CommandCompiler {
    pub fn new(target: BuildTarget, command: CommandSpec) -> Self {
        Self { target, command }
    }
}

#[async_trait]
impl Compiler for CommandCompiler {
    fn target(&self) -> BuildTarget {
        self.target
    }

    async fn run(&self) -> Result<RawStats> {
        tracing::debug!("running {} bundler: {}", self.target, self.command.display());

        let output = self
            .command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BuildError::Spawn {
                program: self.command.program(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(stats) = RawStats::from_json(&stdout) {
            return Ok(stats);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            return Err(BuildError::InvalidStats(first_line(&stdout).to_string()).into());
        }

        let captured = [stdout.trim(), stderr.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let message = if captured.is_empty() {
            format!("{} exited with {}", self.command.program(), output.status)
        } else {
            captured
        };
        Ok(RawStats::failure(message))
    }
}

fn first_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or("<empty output>")
}

/// In-flight and pending flags for one pipeline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompileQueue {
    in_flight: bool,
    pending: bool,
}

impl CompileQueue {
    /// Ask for a pass. Returns `true` when the caller should start it now;
    /// otherwise the request is remembered for when the current pass ends.
    pub fn request(&mut self) -> bool {
        if self.in_flight {
            self.pending = true;
            false
        } else {
            self.in_flight = true;
            true
        }
    }

    /// The current pass ended. Returns `true` when a follow-up pass should
    /// start immediately (it is then in flight).
    pub fn finish(&mut self) -> bool {
        if self.pending {
            self.pending = false;
            true
        } else {
            self.in_flight = false;
            false
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Run one pass on a background task and publish its formatted result.
pub fn spawn_pass(compiler: Arc<dyn Compiler>, bus: EventBus) {
    tokio::spawn(async move {
        let target = compiler.target();
        let stats = match compiler.run().await {
            Ok(stats) => stats,
            Err(e) => RawStats::failure(e.to_string()),
        };
        let result = format_messages(&stats);
        bus.publish(match target {
            BuildTarget::Client => BusEvent::ClientCompiled(result),
            BuildTarget::Server => BusEvent::ServerCompiled(result),
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_coalesces_requests() {
        let mut queue = CompileQueue::default();
        assert!(queue.request());
        assert!(!queue.request());
        assert!(!queue.request());
        assert!(queue.is_in_flight());

        // Two requests during the pass fold into one follow-up
        assert!(queue.finish());
        assert!(queue.is_in_flight());
        assert!(!queue.finish());
        assert!(!queue.is_in_flight());

        assert!(queue.request());
    }

    struct Failing;

    #[async_trait]
    impl Compiler for Failing {
        fn target(&self) -> BuildTarget {
            BuildTarget::Server
        }

        async fn run(&self) -> Result<RawStats> {
            Err(BuildError::InvalidStats("garbage".to_string()).into())
        }
    }

    #[tokio::test]
    async fn compiler_errors_become_build_errors() {
        let (bus, mut rx) = EventBus::new();
        spawn_pass(Arc::new(Failing), bus);

        match rx.recv().await {
            Some(BusEvent::ServerCompiled(result)) => {
                assert_eq!(result.errors.len(), 1);
                assert!(result.errors[0].contains("garbage"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_compiler_parses_stdout() {
        let command = CommandSpec::from_slice(
            "client bundler",
            &[
                "sh".to_string(),
                "-c".to_string(),
                r#"echo '{"errors":[],"warnings":["careful"]}'"#.to_string(),
            ],
        )
        .unwrap();
        let compiler = CommandCompiler::new(BuildTarget::Client, command);

        let stats = compiler.run().await.unwrap();
        assert!(stats.errors.is_empty());
        assert_eq!(stats.warnings.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_compiler_reports_failed_exit() {
        let command = CommandSpec::from_slice(
            "server bundler",
            &[
                "sh".to_string(),
                "-c".to_string(),
                "echo 'config broken' >&2; exit 2".to_string(),
            ],
        )
        .unwrap();
        let compiler = CommandCompiler::new(BuildTarget::Server, command);

        let stats = compiler.run().await.unwrap();
        let result = format_messages(&stats);
        assert_eq!(result.errors, vec!["config broken"]);
    }
}
