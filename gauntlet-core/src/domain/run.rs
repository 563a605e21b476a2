//! Run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::log::LogEntry;

/// Request to start a run
///
/// Immutable once accepted. When `tasks` is non-empty the run goes through
/// the technique-task fan-out instead of the single-task pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Path (relative to the project root) of a newline-delimited list of competition ids
    #[serde(default = "default_competition_set")]
    pub competition_set: String,

    /// Agent identifier understood by the agent-execution tool
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    /// Restrict prepare/grade to the reduced dataset subset
    #[serde(default = "default_true")]
    pub lite: bool,

    #[serde(default = "default_one")]
    pub n_seeds: u32,

    #[serde(default = "default_one")]
    pub n_workers: u32,

    /// Keep agent containers around after the run
    #[serde(default)]
    pub retain: bool,

    /// Override for the dataset directory
    #[serde(default)]
    pub data_dir: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Technique-task ids to run instead of a regular competition run
    #[serde(default)]
    pub tasks: Option<Vec<String>>,
}

fn default_competition_set() -> String {
    "experiments/splits/low.txt".to_string()
}

fn default_agent_id() -> String {
    "dummy".to_string()
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            competition_set: default_competition_set(),
            agent_id: default_agent_id(),
            lite: true,
            n_seeds: 1,
            n_workers: 1,
            retain: false,
            data_dir: None,
            notes: None,
            tasks: None,
        }
    }
}

impl RunRequest {
    /// Technique tasks requested, if any were given
    pub fn technique_tasks(&self) -> Option<&[String]> {
        match self.tasks.as_deref() {
            Some(tasks) if !tasks.is_empty() => Some(tasks),
            _ => None,
        }
    }

    /// Checks the request before a record is created for it
    pub fn validate(&self) -> Result<(), String> {
        if self.competition_set.trim().is_empty() {
            return Err("competition_set cannot be empty".to_string());
        }
        if self.agent_id.trim().is_empty() {
            return Err("agent_id cannot be empty".to_string());
        }
        if self.n_seeds == 0 {
            return Err("n_seeds must be at least 1".to_string());
        }
        if self.n_workers == 0 {
            return Err("n_workers must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Run record
///
/// Owned by the orchestrator's run store; everything else sees clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request: RunRequest,
    pub message: Option<String>,
    /// Name of the run-group directory created by the agent stage
    pub run_group: Option<String>,
    /// Run-group directory, relative to the project root
    pub run_dir: Option<String>,
    pub logs: Vec<LogEntry>,
}

impl RunRecord {
    /// Creates a freshly queued record
    pub fn queued(request: RunRequest) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Queued,
            created_at: now,
            updated_at: now,
            request,
            message: None,
            run_group: None,
            run_dir: None,
            logs: Vec::new(),
        }
    }
}

/// Run lifecycle status
///
/// Moves strictly forward: queued -> running -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// Whether moving from `self` to `next` respects the lifecycle order
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        match (self, next) {
            (RunStatus::Queued, RunStatus::Running) => true,
            // A worker may fail a run before it ever reports running
            (RunStatus::Queued, RunStatus::Failed) => true,
            (RunStatus::Running, RunStatus::Completed | RunStatus::Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}
