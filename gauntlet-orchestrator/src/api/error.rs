//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::{file_service::FileError, run_service::RunError};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Forbidden(String),
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Forbidden(msg) => msg,
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::NotFound(_) => ApiError::NotFound("run not found".to_string()),
            RunError::NotReady { .. } => ApiError::Conflict(err.to_string()),
            RunError::Invalid(msg) => ApiError::BadRequest(msg),
            RunError::MissingRunGroup(_) | RunError::Io(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::AccessDenied(_) => ApiError::Forbidden(err.to_string()),
            FileError::NotFound(_) => ApiError::NotFound("file not found".to_string()),
            FileError::Io(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
