//! Health Check API Handler
//!
//! Simple health check endpoint for monitoring.

use axum::Json;
use gauntlet_core::dto::run::HealthStatus;

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}
