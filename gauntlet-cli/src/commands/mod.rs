//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod catalog;
mod run;

pub use run::{RunArgs, WaitArgs};

use anyhow::Result;
use clap::Subcommand;
use gauntlet_client::GauntletClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a run
    Run(RunArgs),
    /// List all runs, newest first
    List,
    /// Show run details and command logs
    Get {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Show grading report paths of a completed run
    Summary {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Show classified output files of a completed run
    Artifacts {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Wait for a run to complete or fail
    Wait {
        /// Run ID or unambiguous prefix
        id: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
    /// List known competitions
    Competitions,
    /// List technique tasks
    Techniques,
    /// Check that the orchestrator is up
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = GauntletClient::new(&config.server_url);

    match command {
        Commands::Run(args) => run::submit_run(&client, args).await,
        Commands::List => run::list_runs(&client).await,
        Commands::Get { id } => run::get_run(&client, &id).await,
        Commands::Summary { id } => run::get_summary(&client, &id).await,
        Commands::Artifacts { id } => run::get_artifacts(&client, &id).await,
        Commands::Wait { id, wait } => run::wait_for_run(&client, &id, &wait).await,
        Commands::Competitions => catalog::list_competitions(&client).await,
        Commands::Techniques => catalog::list_technique_tasks(&client).await,
        Commands::Health => catalog::health(&client).await,
    }
}
