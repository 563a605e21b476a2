//! Catalog and health endpoints

use crate::GauntletClient;
use crate::error::Result;
use gauntlet_core::dto::run::HealthStatus;
use gauntlet_core::dto::technique::TechniqueCatalog;

impl GauntletClient {
    /// List known competition ids
    pub async fn list_competitions(&self) -> Result<Vec<String>> {
        let response = self.client.get(self.url("/competitions")).send().await?;
        self.handle_response(response).await
    }

    /// List technique tasks and their descriptions
    pub async fn list_technique_tasks(&self) -> Result<TechniqueCatalog> {
        let response = self.client.get(self.url("/technique-tasks")).send().await?;
        self.handle_response(response).await
    }

    /// Liveness check
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.client.get(self.url("/health")).send().await?;
        self.handle_response(response).await
    }
}
