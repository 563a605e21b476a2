//! Test doubles for pipeline tools
//!
//! `ScriptedRunner` stands in for the Python tools: it recognises each stage
//! from its arguments and produces the files the real tool would.

use async_trait::async_trait;
use gauntlet_core::domain::run::RunRequest;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use crate::config::Config;
use crate::pipeline::RunExecutor;
use crate::pipeline::process::{CommandOutput, CommandRunner, StageCommand};
use crate::repository::RunStore;

pub const COMPETITION: &str = "spaceship-titanic";

#[derive(Debug, Default)]
pub struct ScriptedRunner {
    fail_stage: Option<(&'static str, i32, String)>,
    skip_run_groups: bool,
    delay: Option<Duration>,
    counter: AtomicUsize,
}

impl ScriptedRunner {
    pub fn failing(stage: &'static str, code: i32, stderr: &str) -> Self {
        Self {
            fail_stage: Some((stage, code, stderr.to_string())),
            ..Default::default()
        }
    }

    pub fn without_run_groups() -> Self {
        Self {
            skip_run_groups: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Which pipeline stage a recorded command line belongs to
    pub fn stage_of(argv: &[String]) -> &'static str {
        let has = |flag: &str| argv.iter().any(|a| a == flag);
        if has("prepare") {
            "prepare"
        } else if has("--agent-id") {
            "agent"
        } else if has("--metadata") {
            "submission"
        } else if has("grade") {
            "grade"
        } else {
            "unknown"
        }
    }

    fn value_after<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
        let pos = argv.iter().position(|a| a == flag)?;
        argv.get(pos + 1).map(|s| s.as_str())
    }

    fn create_run_group(&self, cwd: &Path, argv: &[String]) -> std::io::Result<()> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let group_dir = cwd
            .join("runs")
            .join(format!("2026-01-01T00-00-{:02}_run-group", n));
        let competition_dir = group_dir.join(format!("{}_{:04}", COMPETITION, n));
        let submission_dir = competition_dir.join("submission");

        fs::create_dir_all(&submission_dir)?;
        fs::create_dir_all(competition_dir.join("logs"))?;
        fs::write(group_dir.join("metadata.json"), "{}")?;
        fs::write(competition_dir.join("logs").join("journal.json"), "[]")?;
        fs::write(competition_dir.join("run.log"), "agent started")?;

        if let Some(task) = Self::value_after(argv, "--technique-task") {
            fs::write(
                submission_dir.join(format!("{}_analysis.json", task)),
                r#"{"finding": "nine to one class ratio"}"#,
            )?;
        } else {
            fs::write(submission_dir.join("submission.csv"), "id,label\n1,0\n")?;
        }

        Ok(())
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &StageCommand, cwd: &Path) -> std::io::Result<CommandOutput> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let argv = command.argv();
        let stage = Self::stage_of(&argv);

        if let Some((failing, code, stderr)) = &self.fail_stage {
            if *failing == stage {
                return Ok(CommandOutput {
                    exit_code: Some(*code),
                    stdout: String::new(),
                    stderr: stderr.clone(),
                });
            }
        }

        match stage {
            "agent" if !self.skip_run_groups => self.create_run_group(cwd, &argv)?,
            "submission" => {
                if let Some(output) = Self::value_after(&argv, "--output") {
                    fs::write(output, "{}\n")?;
                }
            }
            "grade" => {
                if let Some(dir) = Self::value_after(&argv, "--output-dir") {
                    fs::create_dir_all(dir)?;
                    fs::write(
                        PathBuf::from(dir).join("grading_report.json"),
                        r#"{"medals": 0}"#,
                    )?;
                }
            }
            _ => {}
        }

        Ok(CommandOutput {
            exit_code: Some(0),
            stdout: format!("{} ok", stage),
            stderr: String::new(),
        })
    }
}

/// A project root in a temp dir with a one-competition set file
pub struct TestBench {
    pub _tmp: TempDir,
    pub config: Config,
    pub store: RunStore,
    pub executor: Arc<RunExecutor>,
}

impl TestBench {
    pub fn new(runner: ScriptedRunner) -> Self {
        Self::with_config(runner, |_| {})
    }

    pub fn with_config(runner: ScriptedRunner, adjust: impl FnOnce(&mut Config)) -> Self {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x.txt"), format!("{}\n", COMPETITION)).unwrap();

        let mut config = Config::new(tmp.path().to_path_buf());
        adjust(&mut config);

        let store = RunStore::new();
        let executor = Arc::new(RunExecutor::new(&config, store.clone(), Arc::new(runner)));

        Self {
            _tmp: tmp,
            config,
            store,
            executor,
        }
    }

    pub fn request(&self) -> RunRequest {
        RunRequest {
            competition_set: "x.txt".to_string(),
            agent_id: "dummy".to_string(),
            lite: true,
            ..Default::default()
        }
    }
}

impl TestBench {
    /// Application state sharing this bench's store and executor
    pub fn state(&self) -> crate::state::AppState {
        crate::state::AppState::from_parts(
            self.config.clone(),
            self.store.clone(),
            Arc::clone(&self.executor),
        )
    }
}
