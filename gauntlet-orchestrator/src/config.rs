//! Orchestrator configuration
//!
//! Defines where the orchestrator listens, where the project tree and run
//! outputs live, and which external tools make up a pipeline.

use std::path::PathBuf;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (e.g., "127.0.0.1:8000")
    pub bind_addr: String,

    /// Working directory for every pipeline command
    pub project_root: PathBuf,

    /// Directory the agent-execution tool creates run groups in
    pub runs_dir: PathBuf,

    /// Directory holding one subdirectory per known competition
    pub competitions_dir: PathBuf,

    /// Python interpreter used to launch the pipeline tools
    pub python: String,

    /// Module providing the `prepare` and `grade` subcommands
    pub cli_module: String,

    /// Agent-execution script, relative to the project root
    pub agent_script: String,

    /// Submission-builder script, relative to the project root
    pub submission_script: String,

    /// Number of trailing characters of stdout/stderr kept per log entry
    pub output_tail: usize,

    /// Upper bound on concurrently executing runs (0 = unbounded)
    pub max_concurrent_runs: usize,
}

impl Config {
    /// Creates a configuration rooted at `project_root` with defaults
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            runs_dir: project_root.join("runs"),
            competitions_dir: project_root.join("mlebench").join("competitions"),
            project_root,
            python: "python".to_string(),
            cli_module: "mlebench.cli".to_string(),
            agent_script: "run_agent.py".to_string(),
            submission_script: "experiments/make_submission.py".to_string(),
            output_tail: 2000,
            max_concurrent_runs: 0,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognised variables (all optional):
    /// - GAUNTLET_BIND_ADDR (default: 127.0.0.1:8000)
    /// - GAUNTLET_PROJECT_ROOT (default: current directory)
    /// - GAUNTLET_RUNS_DIR (default: <project_root>/runs)
    /// - GAUNTLET_COMPETITIONS_DIR (default: <project_root>/mlebench/competitions)
    /// - GAUNTLET_PYTHON (default: python)
    /// - GAUNTLET_CLI_MODULE (default: mlebench.cli)
    /// - GAUNTLET_AGENT_SCRIPT (default: run_agent.py)
    /// - GAUNTLET_SUBMISSION_SCRIPT (default: experiments/make_submission.py)
    /// - GAUNTLET_OUTPUT_TAIL (default: 2000)
    /// - GAUNTLET_MAX_CONCURRENT_RUNS (default: 0, unbounded)
    pub fn from_env() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::from_lookup(cwd, |key| std::env::var(key).ok()))
    }

    /// Builds a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(cwd: PathBuf, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = lookup("GAUNTLET_PROJECT_ROOT")
            .map(PathBuf::from)
            .unwrap_or(cwd);

        let mut config = Self::new(project_root);

        if let Some(addr) = lookup("GAUNTLET_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(dir) = lookup("GAUNTLET_RUNS_DIR") {
            config.runs_dir = config.project_root.join(dir);
        }
        if let Some(dir) = lookup("GAUNTLET_COMPETITIONS_DIR") {
            config.competitions_dir = config.project_root.join(dir);
        }
        if let Some(python) = lookup("GAUNTLET_PYTHON") {
            config.python = python;
        }
        if let Some(module) = lookup("GAUNTLET_CLI_MODULE") {
            config.cli_module = module;
        }
        if let Some(script) = lookup("GAUNTLET_AGENT_SCRIPT") {
            config.agent_script = script;
        }
        if let Some(script) = lookup("GAUNTLET_SUBMISSION_SCRIPT") {
            config.submission_script = script;
        }

        config.output_tail = lookup("GAUNTLET_OUTPUT_TAIL")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(config.output_tail);

        config.max_concurrent_runs = lookup("GAUNTLET_MAX_CONCURRENT_RUNS")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(config.max_concurrent_runs);

        config
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.python.is_empty() {
            anyhow::bail!("python cannot be empty");
        }

        if self.output_tail == 0 {
            anyhow::bail!("output_tail must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(PathBuf::from("/srv/bench"), lookup_from(&[]));
        assert_eq!(config.project_root, PathBuf::from("/srv/bench"));
        assert_eq!(config.runs_dir, PathBuf::from("/srv/bench/runs"));
        assert_eq!(config.output_tail, 2000);
        assert_eq!(config.max_concurrent_runs, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(
            PathBuf::from("/tmp"),
            lookup_from(&[
                ("GAUNTLET_PROJECT_ROOT", "/srv/bench"),
                ("GAUNTLET_RUNS_DIR", "out"),
                ("GAUNTLET_PYTHON", "python3"),
                ("GAUNTLET_MAX_CONCURRENT_RUNS", "4"),
                ("GAUNTLET_OUTPUT_TAIL", "not-a-number"),
            ]),
        );
        assert_eq!(config.runs_dir, PathBuf::from("/srv/bench/out"));
        assert_eq!(config.python, "python3");
        assert_eq!(config.max_concurrent_runs, 4);
        assert_eq!(config.output_tail, 2000);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::new(PathBuf::from("/srv/bench"));
        assert!(config.validate().is_ok());

        config.output_tail = 0;
        assert!(config.validate().is_err());

        config.output_tail = 10;
        config.python = String::new();
        assert!(config.validate().is_err());
    }
}
