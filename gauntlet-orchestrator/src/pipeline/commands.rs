//! Pipeline tool command lines

use gauntlet_core::domain::run::RunRequest;
use std::path::Path;

use crate::config::Config;
use crate::pipeline::process::StageCommand;

/// Builds the command line for each pipeline stage
#[derive(Debug, Clone)]
pub struct Toolchain {
    python: String,
    cli_module: String,
    agent_script: String,
    submission_script: String,
}

impl Toolchain {
    pub fn from_config(config: &Config) -> Self {
        Self {
            python: config.python.clone(),
            cli_module: config.cli_module.clone(),
            agent_script: config.agent_script.clone(),
            submission_script: config.submission_script.clone(),
        }
    }

    fn cli(&self, subcommand: &str) -> StageCommand {
        StageCommand::new(&self.python)
            .opt("-m", &self.cli_module)
            .arg(subcommand)
    }

    /// `prepare --list <set> [--lite] [--data-dir D]`
    pub fn prepare(&self, req: &RunRequest) -> StageCommand {
        self.cli("prepare")
            .opt("--list", &req.competition_set)
            .flag_if("--lite", req.lite)
            .opt_if("--data-dir", req.data_dir.as_deref())
    }

    /// Agent execution against a private copy of the competition set
    pub fn run_agent(
        &self,
        req: &RunRequest,
        competition_set: &Path,
        technique_task: Option<&str>,
    ) -> StageCommand {
        StageCommand::new(&self.python)
            .arg(&self.agent_script)
            .opt("--agent-id", &req.agent_id)
            .opt("--competition-set", competition_set.to_string_lossy())
            .opt("--n-seeds", req.n_seeds.to_string())
            .opt("--n-workers", req.n_workers.to_string())
            .opt_if("--technique-task", technique_task)
            .flag_if("--retain", req.retain)
            .opt_if("--data-dir", req.data_dir.as_deref())
    }

    pub fn make_submission(&self, metadata: &Path, output: &Path) -> StageCommand {
        StageCommand::new(&self.python)
            .arg(&self.submission_script)
            .opt("--metadata", metadata.to_string_lossy())
            .opt("--output", output.to_string_lossy())
    }

    /// `grade --submission S --output-dir O [--lite] [--data-dir D]`
    pub fn grade(&self, req: &RunRequest, submission: &Path, output_dir: &Path) -> StageCommand {
        self.cli("grade")
            .opt("--submission", submission.to_string_lossy())
            .opt("--output-dir", output_dir.to_string_lossy())
            .flag_if("--lite", req.lite)
            .opt_if("--data-dir", req.data_dir.as_deref())
    }
}
