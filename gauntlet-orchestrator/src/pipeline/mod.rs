//! Pipeline execution
//!
//! Sequences the stages of one run:
//! - Prepare the competition data
//! - Execute the agent and discover the run group it created
//! - Assemble and grade the submission (single-task runs), or grade each
//!   technique task across every discovered run group (fan-out runs)
//!
//! Stages run strictly in order and the first fault ends the run.

pub mod commands;
pub mod discovery;
pub mod error;
mod fanout;
pub mod process;
mod single;

#[cfg(test)]
pub(crate) mod testing;

use gauntlet_core::domain::run::RunRequest;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::config::Config;
use crate::repository::RunStore;

pub use commands::Toolchain;
pub use error::{PipelineError, PipelineResult};
pub use process::{CommandRunner, StageCommand, StageInvoker, TokioCommandRunner};

/// Runs the stages of a pipeline and reports progress to the run store
pub struct RunExecutor {
    store: RunStore,
    invoker: StageInvoker,
    toolchain: Toolchain,
    project_root: PathBuf,
    runs_dir: PathBuf,
}

impl RunExecutor {
    pub fn new(config: &Config, store: RunStore, runner: Arc<dyn CommandRunner>) -> Self {
        let invoker = StageInvoker::new(
            store.clone(),
            runner,
            config.project_root.clone(),
            config.output_tail,
        );

        Self {
            store,
            invoker,
            toolchain: Toolchain::from_config(config),
            project_root: config.project_root.clone(),
            runs_dir: config.runs_dir.clone(),
        }
    }

    /// Executes the pipeline matching `request` and marks the run completed
    ///
    /// Faults are returned to the caller, which owns the failed transition.
    pub async fn execute(&self, run_id: Uuid, request: &RunRequest) -> PipelineResult<()> {
        match request.technique_tasks() {
            Some(tasks) => self.run_technique_tasks(run_id, request, tasks).await,
            None => self.run_single(run_id, request).await,
        }
    }

    /// Copies the competition-set file into a private temporary file
    ///
    /// Concurrent runs never share the path handed to the agent tool. The
    /// file is removed when the returned handle drops.
    fn private_competition_set(&self, competition_set: &str) -> PipelineResult<NamedTempFile> {
        let source = self.project_root.join(competition_set);
        let contents =
            std::fs::read(&source).map_err(|source_err| PipelineError::CompetitionSet {
                path: competition_set.to_string(),
                source: source_err,
            })?;

        let mut file = tempfile::Builder::new()
            .prefix("competition-set-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(&contents)?;
        file.flush()?;

        Ok(file)
    }

    /// Path as reported to clients: relative to the project root when possible
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedRunner, TestBench};
    use super::*;
    use gauntlet_core::domain::run::RunStatus;

    #[tokio::test]
    async fn test_missing_competition_set_faults() {
        let bench = TestBench::new(ScriptedRunner::default());
        let req = RunRequest {
            competition_set: "does/not/exist.txt".to_string(),
            ..Default::default()
        };
        let run = bench.store.create(req.clone());

        let err = bench.executor.execute(run.run_id, &req).await.unwrap_err();
        assert!(matches!(err, PipelineError::CompetitionSet { .. }));
        assert_eq!(bench.store.get(run.run_id).unwrap().status, RunStatus::Queued);
    }

    #[test]
    fn test_display_path_relative_to_project_root() {
        let bench = TestBench::new(ScriptedRunner::default());
        let inside = bench.config.runs_dir.join("g1");
        assert_eq!(bench.executor.display_path(&inside), "runs/g1");
        assert_eq!(
            bench.executor.display_path(Path::new("/elsewhere/g1")),
            "/elsewhere/g1"
        );
    }
}
