//! Log domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in a run's append-only log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    /// One external command invocation
    Command(CommandLog),
    /// Progress marker written between invocations
    Stage {
        stage: String,
        timestamp: DateTime<Utc>,
    },
}

impl LogEntry {
    pub fn stage(stage: impl Into<String>) -> Self {
        LogEntry::Stage {
            stage: stage.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn as_command(&self) -> Option<&CommandLog> {
        match self {
            LogEntry::Command(log) => Some(log),
            LogEntry::Stage { .. } => None,
        }
    }
}

/// Captured outcome of an external command
///
/// `stdout` and `stderr` hold only the trimmed tail of each stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLog {
    pub command: Vec<String>,
    /// `None` when the process never started or was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timestamp: DateTime<Utc>,
}
