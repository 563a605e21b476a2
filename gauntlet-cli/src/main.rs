//! Gauntlet CLI
//!
//! Command-line interface for submitting and inspecting benchmark runs.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "gauntlet")]
#[command(about = "Gauntlet benchmark run CLI", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(
        long,
        env = "GAUNTLET_SERVER_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server,
    };

    handle_command(cli.command, &config).await
}
