//! Run API Handlers
//!
//! HTTP endpoints for run intake and run queries.

use axum::{
    Json,
    extract::{Path, State},
};
use gauntlet_core::domain::run::{RunRecord, RunRequest};
use gauntlet_core::dto::artifact::{ArtifactInventory, RunSummary};
use gauntlet_core::dto::run::CreateRunResponse;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::run_service;
use crate::state::AppState;

/// POST /runs
/// Create a run and start its pipeline in the background
pub async fn create_run(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> ApiResult<Json<CreateRunResponse>> {
    tracing::info!("Launching run for set: {}", req.competition_set);

    let record = run_service::launch_run(&state, req)?;

    Ok(Json(CreateRunResponse {
        run_id: record.run_id,
        status: record.status,
    }))
}

/// GET /runs
/// List all runs, newest first
pub async fn list_runs(State(state): State<AppState>) -> Json<Vec<RunRecord>> {
    tracing::debug!("Listing all runs");
    Json(run_service::list_runs(&state.store))
}

/// A malformed id names no run
fn parse_run_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound("run not found".to_string()))
}

/// GET /runs/{id}
/// Get run details by ID
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RunRecord>> {
    tracing::debug!("Getting run: {}", id);
    Ok(Json(run_service::get_run(&state.store, parse_run_id(&id)?)?))
}

/// GET /runs/{id}/summary
/// Grading report paths of a completed run
pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RunSummary>> {
    tracing::debug!("Getting summary for run: {}", id);
    Ok(Json(run_service::run_summary(&state, parse_run_id(&id)?).await?))
}

/// GET /runs/{id}/artifacts
/// Classified file inventory of a completed run
pub async fn get_artifacts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ArtifactInventory>> {
    tracing::debug!("Getting artifacts for run: {}", id);
    Ok(Json(run_service::run_artifacts(&state, parse_run_id(&id)?).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedRunner, TestBench};
    use crate::repository::RunUpdate;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use tower::ServiceExt;
    use gauntlet_core::domain::run::RunStatus;

    #[tokio::test]
    async fn test_artifacts_while_running_conflict() {
        let bench = TestBench::new(ScriptedRunner::default());
        let run = bench.store.create(bench.request());
        bench.store.update(run.run_id, RunUpdate::running());

        let err = get_artifacts(State(bench.state()), Path(run.run_id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_run_not_found() {
        let bench = TestBench::new(ScriptedRunner::default());
        let err = get_run(State(bench.state()), Path(Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_run_rejects_bad_request() {
        let bench = TestBench::new(ScriptedRunner::default());
        let req = RunRequest {
            agent_id: " ".to_string(),
            ..bench.request()
        };
        let err = create_run(State(bench.state()), Json(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_then_poll_until_completed() {
        let bench = TestBench::new(ScriptedRunner::default());
        let state = bench.state();

        let Json(created) = create_run(State(state.clone()), Json(bench.request()))
            .await
            .unwrap();
        assert_eq!(created.status, RunStatus::Queued);

        let mut record = None;
        for _ in 0..100 {
            let Json(current) = get_run(State(state.clone()), Path(created.run_id.to_string()))
                .await
                .unwrap();
            if current.status.is_terminal() {
                record = Some(current);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let record = record.unwrap();
        assert_eq!(record.status, RunStatus::Completed);
        assert!(record.run_group.is_some());

        let Json(summary) = get_summary(State(state), Path(created.run_id.to_string()))
            .await
            .unwrap();
        assert_eq!(summary.grading_reports.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_run_id_not_found() {
        let bench = TestBench::new(ScriptedRunner::default());

        for uri in [
            "/runs/not-a-uuid",
            "/runs/not-a-uuid/summary",
            "/runs/not-a-uuid/artifacts",
        ] {
            let response = crate::api::create_router(bench.state())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "run not found");
        }
    }
}
