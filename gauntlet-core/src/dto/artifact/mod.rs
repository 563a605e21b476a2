//! Summary and artifact DTOs for completed runs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grading report locations for a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub run_group: String,
    pub run_dir: String,
    pub grading_reports: Vec<String>,
}

/// Category a run output file is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Submission,
    GradingReport,
    Log,
    Metadata,
    Rollout,
    Code,
}

/// Best-effort inventory of a run's output files, bucketed by kind
///
/// Paths are relative to the project root and sorted within each bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInventory {
    pub run_id: Uuid,
    pub run_group: String,
    pub run_dir: String,
    pub submissions: Vec<String>,
    pub grading_reports: Vec<String>,
    pub logs: Vec<String>,
    pub rollouts: Vec<String>,
    pub code: Vec<String>,
    pub metadata: Vec<String>,
}

impl ArtifactInventory {
    pub fn new(run_id: Uuid, run_group: String, run_dir: String) -> Self {
        Self {
            run_id,
            run_group,
            run_dir,
            submissions: Vec::new(),
            grading_reports: Vec::new(),
            logs: Vec::new(),
            rollouts: Vec::new(),
            code: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn bucket(&self, kind: ArtifactKind) -> &[String] {
        match kind {
            ArtifactKind::Submission => &self.submissions,
            ArtifactKind::GradingReport => &self.grading_reports,
            ArtifactKind::Log => &self.logs,
            ArtifactKind::Metadata => &self.metadata,
            ArtifactKind::Rollout => &self.rollouts,
            ArtifactKind::Code => &self.code,
        }
    }

    pub fn bucket_mut(&mut self, kind: ArtifactKind) -> &mut Vec<String> {
        match kind {
            ArtifactKind::Submission => &mut self.submissions,
            ArtifactKind::GradingReport => &mut self.grading_reports,
            ArtifactKind::Log => &mut self.logs,
            ArtifactKind::Metadata => &mut self.metadata,
            ArtifactKind::Rollout => &mut self.rollouts,
            ArtifactKind::Code => &mut self.code,
        }
    }
}
