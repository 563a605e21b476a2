//! Catalog command handlers

use anyhow::Result;
use colored::*;
use gauntlet_client::GauntletClient;

/// List known competitions
pub async fn list_competitions(client: &GauntletClient) -> Result<()> {
    let ids = client.list_competitions().await?;

    if ids.is_empty() {
        println!("{}", "No competitions found.".yellow());
    } else {
        println!("{}", format!("Found {} competition(s):", ids.len()).bold());
        for id in ids {
            println!("  {} {}", "▸".cyan(), id);
        }
    }

    Ok(())
}

/// List technique tasks with their descriptions
pub async fn list_technique_tasks(client: &GauntletClient) -> Result<()> {
    let catalog = client.list_technique_tasks().await?;

    println!("{}", "Technique tasks:".bold());
    for id in &catalog.available {
        let description = catalog
            .descriptions
            .get(id)
            .map(String::as_str)
            .unwrap_or("");
        println!("  {:<10} {}", id.cyan(), description.dimmed());
    }

    Ok(())
}

/// Check orchestrator liveness
pub async fn health(client: &GauntletClient) -> Result<()> {
    let status = client.health().await?;
    println!(
        "{} {} ({})",
        "✓".green(),
        client.base_url(),
        status.status
    );
    Ok(())
}
