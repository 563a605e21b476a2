//! Process invocation
//!
//! Runs pipeline tools as external processes, records every invocation in
//! the run's log, and turns nonzero exits into pipeline faults.

use async_trait::async_trait;
use chrono::Utc;
use gauntlet_core::domain::log::{CommandLog, LogEntry};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::repository::RunStore;

/// An external command: program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl StageCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends `flag value` to the argument list
    pub fn opt(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Appends `flag` only when `enabled`
    pub fn flag_if(self, flag: &str, enabled: bool) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    /// Appends `flag value` only when a value is present
    pub fn opt_if(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.opt(flag, value),
            None => self,
        }
    }

    /// Program and arguments as one vector, as recorded in the run log
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Message attached to a failed run: stderr, else stdout, else a generic text
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        "command failed".to_string()
    }
}

/// Runs a command to completion and captures its output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &StageCommand, cwd: &Path) -> std::io::Result<CommandOutput>;
}

/// Spawns real processes with `tokio::process`
#[derive(Debug, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &StageCommand, cwd: &Path) -> std::io::Result<CommandOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Last `max_chars` characters of the trimmed text
pub fn tail(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - max_chars).collect()
}

/// Invokes stage commands on behalf of a run
///
/// Every invocation appends exactly one command entry to the run's log,
/// whether or not the process succeeded.
#[derive(Clone)]
pub struct StageInvoker {
    store: RunStore,
    runner: Arc<dyn CommandRunner>,
    cwd: PathBuf,
    output_tail: usize,
}

impl StageInvoker {
    pub fn new(
        store: RunStore,
        runner: Arc<dyn CommandRunner>,
        cwd: PathBuf,
        output_tail: usize,
    ) -> Self {
        Self {
            store,
            runner,
            cwd,
            output_tail,
        }
    }

    pub async fn invoke(&self, run_id: Uuid, command: &StageCommand) -> PipelineResult<CommandOutput> {
        debug!("Run {}: executing {}", run_id, command);

        let output = match self.runner.run(command, &self.cwd).await {
            Ok(output) => output,
            Err(e) => {
                let message = format!("Failed to start {}: {}", command.program, e);
                warn!("Run {}: {}", run_id, message);
                self.record(run_id, command, None, "", &message);
                return Err(PipelineError::StageFailed {
                    command: command.to_string(),
                    message,
                });
            }
        };

        self.record(
            run_id,
            command,
            output.exit_code,
            &output.stdout,
            &output.stderr,
        );

        if !output.success() {
            debug!(
                "Run {}: command exited with {:?}: {}",
                run_id, output.exit_code, command
            );
            return Err(PipelineError::StageFailed {
                command: command.to_string(),
                message: output.failure_message(),
            });
        }

        Ok(output)
    }

    fn record(
        &self,
        run_id: Uuid,
        command: &StageCommand,
        exit_code: Option<i32>,
        stdout: &str,
        stderr: &str,
    ) {
        self.store.append_log(
            run_id,
            LogEntry::Command(CommandLog {
                command: command.argv(),
                exit_code,
                stdout: tail(stdout, self.output_tail),
                stderr: tail(stderr, self.output_tail),
                timestamp: Utc::now(),
            }),
        );
    }
}
