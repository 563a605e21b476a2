//! Run command handlers
//!
//! Handles submitting runs, listing and inspecting them, and waiting on them.

use anyhow::Result;
use clap::Args;
use colored::*;
use gauntlet_client::{GauntletClient, ensure_completed};
use gauntlet_core::domain::log::LogEntry;
use gauntlet_core::domain::run::{RunRecord, RunRequest, RunStatus};
use std::time::Duration;

use crate::id_resolver::resolve_run_id;
use crate::types::IdOrPrefix;

/// Options for `gauntlet run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Competition-set file, relative to the project root
    #[arg(long, default_value = "experiments/splits/low.txt")]
    pub competition_set: String,

    /// Agent to execute
    #[arg(long, default_value = "dummy")]
    pub agent_id: String,

    /// Use full datasets instead of lite ones
    #[arg(long)]
    pub full: bool,

    #[arg(long, default_value_t = 1)]
    pub n_seeds: u32,

    #[arg(long, default_value_t = 1)]
    pub n_workers: u32,

    /// Keep agent containers after the run
    #[arg(long)]
    pub retain: bool,

    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Technique task to run; repeat for several
    #[arg(long = "task")]
    pub tasks: Vec<String>,

    /// Block until the run completes or fails
    #[arg(long)]
    pub wait: bool,

    #[command(flatten)]
    pub wait_args: WaitArgs,
}

impl RunArgs {
    fn to_request(&self) -> RunRequest {
        RunRequest {
            competition_set: self.competition_set.clone(),
            agent_id: self.agent_id.clone(),
            lite: !self.full,
            n_seeds: self.n_seeds,
            n_workers: self.n_workers,
            retain: self.retain,
            data_dir: self.data_dir.clone(),
            notes: self.notes.clone(),
            tasks: (!self.tasks.is_empty()).then(|| self.tasks.clone()),
        }
    }
}

/// Polling options shared by `run --wait` and `wait`
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Seconds between status checks
    #[arg(long, default_value_t = 5)]
    pub poll_interval: u64,

    /// Seconds to wait before giving up (the run itself keeps going)
    #[arg(long, default_value_t = 3600)]
    pub timeout: u64,
}

/// Submit a run, optionally waiting for it
pub async fn submit_run(client: &GauntletClient, args: RunArgs) -> Result<()> {
    let created = client.create_run(&args.to_request()).await?;

    println!(
        "{} Run {} {}",
        "✓".green(),
        created.run_id.to_string().cyan(),
        colorize_status(created.status)
    );

    if args.wait {
        let record = wait(client, created.run_id, &args.wait_args).await?;
        print_run_details(&record);
        ensure_completed(record)?;
    }

    Ok(())
}

/// List all runs
pub async fn list_runs(client: &GauntletClient) -> Result<()> {
    let runs = client.list_runs().await?;

    if runs.is_empty() {
        println!("{}", "No runs found.".yellow());
    } else {
        println!("{}", format!("Found {} run(s):", runs.len()).bold());
        println!();
        for run in runs {
            print_run_summary(&run);
        }
    }

    Ok(())
}

/// Get and display a single run
pub async fn get_run(client: &GauntletClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let run = client.get_run(uuid).await?;

    print_run_details(&run);

    Ok(())
}

/// Show grading report paths
pub async fn get_summary(client: &GauntletClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let summary = client.get_summary(uuid).await?;

    println!("{}", "Run Summary:".bold());
    println!("  ID:        {}", summary.run_id.to_string().cyan());
    println!("  Run group: {}", summary.run_group);
    println!("  Directory: {}", summary.run_dir.dimmed());
    print_paths("Grading reports", &summary.grading_reports);

    Ok(())
}

/// Show the classified artifact inventory
pub async fn get_artifacts(client: &GauntletClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let inventory = client.get_artifacts(uuid).await?;

    println!("{}", format!("Artifacts for run {}:", inventory.run_id).bold());
    println!("  Directory: {}", inventory.run_dir.dimmed());
    print_paths("Submissions", &inventory.submissions);
    print_paths("Grading reports", &inventory.grading_reports);
    print_paths("Logs", &inventory.logs);
    print_paths("Rollouts", &inventory.rollouts);
    print_paths("Code", &inventory.code);
    print_paths("Metadata", &inventory.metadata);

    Ok(())
}

/// Wait on an existing run
pub async fn wait_for_run(client: &GauntletClient, id: &str, args: &WaitArgs) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let record = wait(client, uuid, args).await?;

    print_run_details(&record);
    ensure_completed(record)?;

    Ok(())
}

async fn wait(client: &GauntletClient, run_id: uuid::Uuid, args: &WaitArgs) -> Result<RunRecord> {
    println!(
        "{}",
        format!("Waiting for run {} (timeout {}s)...", run_id, args.timeout).dimmed()
    );
    let record = client
        .wait_for_completion(
            run_id,
            Duration::from_secs(args.poll_interval.max(1)),
            Duration::from_secs(args.timeout),
        )
        .await?;
    Ok(record)
}

/// Print one line block per run
fn print_run_summary(run: &RunRecord) {
    println!("  {} Run {}", "▸".cyan(), run.run_id.to_string().dimmed());
    println!("    Agent:   {}", run.request.agent_id);
    println!("    Status:  {}", colorize_status(run.status));
    println!(
        "    Created: {}",
        run.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(group) = &run.run_group {
        println!("    Group:   {}", group.dimmed());
    }
    println!();
}

/// Print detailed run information
fn print_run_details(run: &RunRecord) {
    println!("{}", "Run Details:".bold());
    println!("  ID:         {}", run.run_id.to_string().cyan());
    println!("  Status:     {}", colorize_status(run.status));
    println!("  Agent:      {}", run.request.agent_id);
    println!("  Set:        {}", run.request.competition_set);
    println!("  Lite:       {}", run.request.lite);
    if let Some(tasks) = run.request.technique_tasks() {
        println!("  Tasks:      {}", tasks.join(", "));
    }
    println!("  Created:    {}", run.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:    {}", run.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(dir) = &run.run_dir {
        println!("  Directory:  {}", dir);
    }
    if let Some(notes) = &run.request.notes {
        println!("  Notes:      {}", notes.dimmed());
    }
    if let Some(message) = &run.message {
        println!("\n{}", "Error:".bold());
        println!("{}", message.red());
    }

    if !run.logs.is_empty() {
        println!("\n{}", "Logs:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for entry in &run.logs {
            print_log_entry(entry);
        }
        println!("{}", "─".repeat(80).dimmed());
    }
}

fn print_log_entry(entry: &LogEntry) {
    match entry {
        LogEntry::Command(log) => {
            let code = match log.exit_code {
                Some(0) => "0".green(),
                Some(code) => code.to_string().red(),
                None => "-".red(),
            };
            println!(
                "{} [{}] {}",
                log.timestamp.format("%H:%M:%S").to_string().dimmed(),
                code,
                log.command.join(" ")
            );
        }
        LogEntry::Stage { stage, timestamp } => {
            println!(
                "{} {} {}",
                timestamp.format("%H:%M:%S").to_string().dimmed(),
                "»".cyan(),
                stage
            );
        }
    }
}

fn print_paths(title: &str, paths: &[String]) {
    println!("\n{} ({})", title.bold(), paths.len());
    for path in paths {
        println!("  {}", path);
    }
}

/// Colorize run status for display
fn colorize_status(status: RunStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        RunStatus::Queued => status_str.yellow(),
        RunStatus::Running => status_str.cyan(),
        RunStatus::Completed => status_str.green(),
        RunStatus::Failed => status_str.red(),
    }
}
