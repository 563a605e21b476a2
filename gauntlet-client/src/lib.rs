//! Gauntlet HTTP Client
//!
//! A simple, type-safe HTTP client for the Gauntlet orchestrator API.
//!
//! # Example
//!
//! ```no_run
//! use gauntlet_client::GauntletClient;
//! use gauntlet_core::domain::run::RunRequest;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GauntletClient::new("http://127.0.0.1:8000");
//!
//!     let created = client.create_run(&RunRequest::default()).await?;
//!     let record = client
//!         .wait_for_completion(created.run_id, Duration::from_secs(5), Duration::from_secs(3600))
//!         .await?;
//!
//!     println!("Run {} is {}", record.run_id, record.status);
//!     Ok(())
//! }
//! ```

mod catalog;
pub mod error;
pub mod runs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use runs::ensure_completed;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Gauntlet orchestrator API
///
/// Methods are grouped by resource:
/// - Runs (create, list, get, summary, artifacts, wait)
/// - Catalogs (competitions, technique tasks) and health
#[derive(Debug, Clone)]
pub struct GauntletClient {
    /// Base URL of the orchestrator (e.g., "http://127.0.0.1:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl GauntletClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use gauntlet_client::GauntletClient;
    ///
    /// let client = GauntletClient::new("http://127.0.0.1:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is raw bytes
    async fn handle_bytes(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GauntletClient::new("http://127.0.0.1:8000");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GauntletClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.url("/runs"), "http://127.0.0.1:8000/runs");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = GauntletClient::with_client("http://bench:8000", Client::new());
        assert_eq!(client.base_url(), "http://bench:8000");
    }
}
