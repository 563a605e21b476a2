//! Run-related API endpoints

use crate::GauntletClient;
use crate::error::{ClientError, Result};
use gauntlet_core::domain::run::{RunRecord, RunRequest, RunStatus};
use gauntlet_core::dto::artifact::{ArtifactInventory, RunSummary};
use gauntlet_core::dto::run::CreateRunResponse;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

impl GauntletClient {
    // =============================================================================
    // Run Intake
    // =============================================================================

    /// Submit a run; the orchestrator returns as soon as it is queued
    pub async fn create_run(&self, req: &RunRequest) -> Result<CreateRunResponse> {
        let response = self.client.post(self.url("/runs")).json(req).send().await?;
        self.handle_response(response).await
    }

    // =============================================================================
    // Run Queries
    // =============================================================================

    /// List all runs, newest first
    pub async fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let response = self.client.get(self.url("/runs")).send().await?;
        self.handle_response(response).await
    }

    /// Get a run by ID
    pub async fn get_run(&self, run_id: Uuid) -> Result<RunRecord> {
        let response = self
            .client
            .get(self.url(&format!("/runs/{}", run_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Grading report paths of a completed run (409 until it completes)
    pub async fn get_summary(&self, run_id: Uuid) -> Result<RunSummary> {
        let response = self
            .client
            .get(self.url(&format!("/runs/{}/summary", run_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Classified artifacts of a completed run (409 until it completes)
    pub async fn get_artifacts(&self, run_id: Uuid) -> Result<ArtifactInventory> {
        let response = self
            .client
            .get(self.url(&format!("/runs/{}/artifacts", run_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Download a run output file by its project-relative path
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(&format!("/files/{}", path.trim_start_matches('/'))))
            .send()
            .await?;
        self.handle_bytes(response).await
    }

    // =============================================================================
    // Waiting
    // =============================================================================

    /// Poll a run until it is completed or failed
    ///
    /// Returns the terminal record, or `ClientError::Timeout` once `timeout`
    /// has passed. Timing out only stops the polling; the run keeps going on
    /// the server.
    pub async fn wait_for_completion(
        &self,
        run_id: Uuid,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<RunRecord> {
        let started = Instant::now();

        loop {
            let record = self.get_run(run_id).await?;
            if record.status.is_terminal() {
                return Ok(record);
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(ClientError::Timeout {
                    run_id,
                    status: record.status.to_string(),
                    waited,
                });
            }

            tracing::debug!("Run {} is {}, polling again", run_id, record.status);
            tokio::time::sleep(poll_interval.min(timeout - waited)).await;
        }
    }
}

/// Turn a failed terminal record into `ClientError::RunFailed`
pub fn ensure_completed(record: RunRecord) -> Result<RunRecord> {
    match record.status {
        RunStatus::Failed => Err(ClientError::RunFailed {
            run_id: record.run_id,
            message: record
                .message
                .unwrap_or_else(|| "no message recorded".to_string()),
        }),
        _ => Ok(record),
    }
}
