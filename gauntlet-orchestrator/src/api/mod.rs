//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod catalog;
pub mod error;
pub mod files;
pub mod health;
pub mod run;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Run endpoints
        .route("/runs", post(run::create_run).get(run::list_runs))
        .route("/runs/{id}", get(run::get_run))
        .route("/runs/{id}/summary", get(run::get_summary))
        .route("/runs/{id}/artifacts", get(run::get_artifacts))
        // Catalogs
        .route("/competitions", get(catalog::list_competitions))
        .route("/technique-tasks", get(catalog::list_technique_tasks))
        // Downloads
        .route("/files/{*path}", get(files::download_file))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
