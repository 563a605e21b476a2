//! Run DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::run::RunStatus;

/// Response to an accepted run request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunResponse {
    pub run_id: Uuid,
    pub status: RunStatus,
}

/// Liveness check body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
