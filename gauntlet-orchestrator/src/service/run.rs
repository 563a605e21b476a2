//! Run Service
//!
//! Business logic for run intake and run queries.

use gauntlet_core::domain::run::{RunRecord, RunRequest, RunStatus};
use gauntlet_core::dto::artifact::{ArtifactInventory, RunSummary};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::RunStore;
use crate::service::artifact;
use crate::state::AppState;

/// Service error type
#[derive(Debug, Error)]
pub enum RunError {
    #[error("run {0} not found")]
    NotFound(Uuid),

    #[error("run not completed yet, status={status}")]
    NotReady { id: Uuid, status: RunStatus },

    #[error("{0}")]
    Invalid(String),

    #[error("run {0} completed without a run group")]
    MissingRunGroup(Uuid),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunError>;

/// Validate, record and dispatch a new run
///
/// Returns as soon as the record exists; the pipeline runs in the background.
pub fn launch_run(state: &AppState, req: RunRequest) -> Result<RunRecord> {
    req.validate().map_err(RunError::Invalid)?;

    let record = state.store.create(req);
    tracing::info!(
        "Run created: {} (agent: {}, set: {})",
        record.run_id,
        record.request.agent_id,
        record.request.competition_set
    );

    state.scheduler.dispatch(record.run_id, record.request.clone());

    Ok(record)
}

/// Get a run by ID
pub fn get_run(store: &RunStore, id: Uuid) -> Result<RunRecord> {
    store.get(id).ok_or(RunError::NotFound(id))
}

/// List all runs, newest first
pub fn list_runs(store: &RunStore) -> Vec<RunRecord> {
    store.list()
}

/// Grading report locations of a completed run
pub async fn run_summary(state: &AppState, id: Uuid) -> Result<RunSummary> {
    let (record, run_group) = completed_run(&state.store, id)?;
    let group_dir = state.config.runs_dir.join(&run_group);
    let project_root = state.config.project_root.clone();

    let grading_reports =
        blocking(move || artifact::grading_reports(&group_dir, &project_root)).await?;

    Ok(RunSummary {
        run_id: record.run_id,
        run_group,
        run_dir: record.run_dir.unwrap_or_default(),
        grading_reports,
    })
}

/// Classified file inventory of a completed run
pub async fn run_artifacts(state: &AppState, id: Uuid) -> Result<ArtifactInventory> {
    let (record, run_group) = completed_run(&state.store, id)?;
    let group_dir: PathBuf = state.config.runs_dir.join(&run_group);
    let project_root = state.config.project_root.clone();
    let empty = ArtifactInventory::new(
        record.run_id,
        run_group,
        record.run_dir.unwrap_or_default(),
    );

    blocking(move || artifact::inventory(empty, &group_dir, &project_root)).await
}

fn completed_run(store: &RunStore, id: Uuid) -> Result<(RunRecord, String)> {
    let record = get_run(store, id)?;

    if record.status != RunStatus::Completed {
        return Err(RunError::NotReady {
            id,
            status: record.status,
        });
    }

    let run_group = record
        .run_group
        .clone()
        .ok_or(RunError::MissingRunGroup(id))?;

    Ok((record, run_group))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RunError::Io(std::io::Error::other(e)))
}
