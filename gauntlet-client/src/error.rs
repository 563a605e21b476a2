//! Error types for the Gauntlet client

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Gauntlet client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Run did not reach a terminal state in time
    #[error("Run {run_id} still {status} after {waited:?}")]
    Timeout {
        run_id: Uuid,
        status: String,
        waited: Duration,
    },

    /// Run reached the failed state
    #[error("Run {run_id} failed: {message}")]
    RunFailed { run_id: Uuid, message: String },
}

impl ClientError {
    /// Create an API error from status code and response body
    ///
    /// Bodies of the form `{"error": "..."}` are reduced to the message.
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(body);

        Self::ApiError { status, message }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the run exists but has not completed yet
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::ApiError { status: 409, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
