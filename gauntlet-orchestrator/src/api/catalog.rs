//! Catalog API Handlers
//!
//! Read-only listings of competitions and technique tasks.

use axum::{Json, extract::State};
use gauntlet_core::dto::technique::TechniqueCatalog;

use crate::api::error::{ApiError, ApiResult};
use crate::service::competition_service;
use crate::state::AppState;
use crate::technique;

/// GET /competitions
/// List known competition ids
pub async fn list_competitions(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let dir = state.config.competitions_dir.clone();
    let ids = tokio::task::spawn_blocking(move || competition_service::list_competition_ids(&dir))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .map_err(|e| ApiError::InternalError(format!("Failed to list competitions: {}", e)))?;

    Ok(Json(ids))
}

/// GET /technique-tasks
/// List available technique tasks with descriptions
pub async fn list_technique_tasks() -> Json<TechniqueCatalog> {
    Json(technique::catalog())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedRunner, TestBench};

    #[tokio::test]
    async fn test_competitions_from_config_dir() {
        let bench = TestBench::new(ScriptedRunner::default());
        let dir = bench.config.competitions_dir.join("spaceship-titanic");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "id: spaceship-titanic").unwrap();

        let Json(ids) = list_competitions(State(bench.state())).await.unwrap();
        assert_eq!(ids, vec!["spaceship-titanic"]);
    }

    #[tokio::test]
    async fn test_technique_catalog() {
        let Json(catalog) = list_technique_tasks().await;
        assert!(catalog.available.contains(&"cv".to_string()));
        assert_eq!(catalog.available.len(), catalog.descriptions.len());
    }
}
