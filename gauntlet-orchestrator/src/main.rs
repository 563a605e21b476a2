use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod pipeline;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod technique;

use config::Config;
use pipeline::TokioCommandRunner;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gauntlet_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gauntlet Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Project root: {}", config.project_root.display());
    tracing::info!("Runs directory: {}", config.runs_dir.display());
    if config.max_concurrent_runs > 0 {
        tracing::info!("At most {} concurrent run(s)", config.max_concurrent_runs);
    }

    let addr = config.bind_addr.clone();
    let state = AppState::new(config, Arc::new(TokioCommandRunner));

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
