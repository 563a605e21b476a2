//! Technique-task fan-out
//!
//! One logical run, one agent invocation per technique task. Each invocation
//! creates its own run group; the first one found represents the run.

use gauntlet_core::domain::grade::CompetitionGrades;
use gauntlet_core::domain::log::LogEntry;
use gauntlet_core::domain::run::RunRequest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::RunExecutor;
use crate::pipeline::discovery;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::repository::RunUpdate;
use crate::technique;

/// File the merged grades are written to inside the first run group
pub const TECHNIQUE_GRADES_FILE: &str = "technique_grades.json";

impl RunExecutor {
    pub(super) async fn run_technique_tasks(
        &self,
        run_id: Uuid,
        req: &RunRequest,
        tasks: &[String],
    ) -> PipelineResult<()> {
        info!("Run {}: preparing {}", run_id, req.competition_set);
        self.invoker
            .invoke(run_id, &self.toolchain.prepare(req))
            .await?;

        let mut known = discovery::snapshot(&self.runs_dir);
        let mut run_groups = Vec::new();

        for task in tasks {
            info!("Run {}: running technique-task {}", run_id, task);
            self.store.append_log(
                run_id,
                LogEntry::stage(format!("running technique-task: {}", task)),
            );

            {
                let competition_set = self.private_competition_set(&req.competition_set)?;
                let command = self
                    .toolchain
                    .run_agent(req, competition_set.path(), Some(task));
                self.invoker.invoke(run_id, &command).await?;
            }

            match discovery::discover(&self.runs_dir, &known) {
                Some(group) => {
                    info!("Run {}: task {} created run group {}", run_id, task, group);
                    known.insert(group.clone());
                    run_groups.push(group);
                }
                None => warn!("Run {}: task {} created no run group", run_id, task),
            }
        }

        let Some(main_group) = run_groups.first().cloned() else {
            return Err(PipelineError::DiscoveryFailed(
                "could not find any run groups after technique-task runs".to_string(),
            ));
        };
        let main_dir = self.runs_dir.join(&main_group);

        let group_dirs: Vec<PathBuf> = run_groups.iter().map(|g| self.runs_dir.join(g)).collect();
        let grades = {
            let tasks = tasks.to_vec();
            tokio::task::spawn_blocking(move || grade_run_groups(&group_dirs, &tasks))
                .await
                .map_err(|e| PipelineError::Io(std::io::Error::other(e)))??
        };

        let grades_path = main_dir.join(TECHNIQUE_GRADES_FILE);
        tokio::fs::write(&grades_path, serde_json::to_string_pretty(&grades)?).await?;
        info!(
            "Run {}: wrote grades for {} competition(s) to {}",
            run_id,
            grades.len(),
            grades_path.display()
        );

        self.store.update(
            run_id,
            RunUpdate::completed(&main_group, self.display_path(&main_dir)),
        );
        info!("Run {} completed in {}", run_id, main_dir.display());

        Ok(())
    }
}

/// Grades every `<competition>_*/submission` directory under the given run groups
///
/// Results are keyed by competition id, the subdirectory name up to its
/// first `_`. Grades for the same competition are merged task by task,
/// keeping the better grade. Blocking; call off the async workers.
pub fn grade_run_groups(
    group_dirs: &[PathBuf],
    tasks: &[String],
) -> PipelineResult<BTreeMap<String, CompetitionGrades>> {
    let mut all_grades: BTreeMap<String, CompetitionGrades> = BTreeMap::new();

    for group_dir in group_dirs {
        for competition_dir in subdirectories(group_dir)? {
            let submission_dir = competition_dir.join("submission");
            if !submission_dir.is_dir() {
                continue;
            }

            let Some(competition_id) = competition_id(&competition_dir) else {
                continue;
            };

            let grades = technique::grade_all(&submission_dir, tasks);
            all_grades
                .entry(competition_id)
                .or_default()
                .merge(grades);
        }
    }

    Ok(all_grades)
}

fn subdirectories(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn competition_id(dir: &Path) -> Option<String> {
    let name = dir.file_name()?.to_string_lossy();
    name.split('_').next().map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedRunner, TestBench};
    use gauntlet_core::domain::run::RunStatus;
    use std::fs;
    use tempfile::TempDir;

    fn technique_request(bench: &TestBench, tasks: &[&str]) -> RunRequest {
        RunRequest {
            tasks: Some(tasks.iter().map(|t| t.to_string()).collect()),
            ..bench.request()
        }
    }

    #[test]
    fn test_competition_id_from_dir_name() {
        assert_eq!(
            competition_id(Path::new("/runs/g/spaceship-titanic_3f2a")),
            Some("spaceship-titanic".to_string())
        );
        assert_eq!(
            competition_id(Path::new("/runs/g/plain")),
            Some("plain".to_string())
        );
    }

    #[test]
    fn test_grades_merge_across_groups() {
        let tmp = TempDir::new().unwrap();
        let g1 = tmp.path().join("g1");
        let g2 = tmp.path().join("g2");
        fs::create_dir_all(g1.join("titanic_a/submission")).unwrap();
        fs::create_dir_all(g2.join("titanic_b/submission")).unwrap();
        fs::create_dir_all(g2.join("no-submission_c")).unwrap();
        fs::write(g1.join("titanic_a/submission/imbalance_analysis.json"), "skewed").unwrap();
        fs::write(g2.join("titanic_b/submission/missing_analysis.json"), "median fill").unwrap();

        let tasks = vec!["imbalance".to_string(), "missing".to_string()];
        let grades = grade_run_groups(&[g1, g2], &tasks).unwrap();

        assert_eq!(grades.keys().collect::<Vec<_>>(), vec!["titanic"]);
        let titanic = &grades["titanic"];
        assert_eq!(titanic.tasks.len(), 2);
        // Each group only analysed its own task; neither erases the other
        assert!(titanic.tasks["imbalance"].passed);
        assert!(titanic.tasks["missing"].passed);
        assert_eq!(titanic.summary.pass_rate, 1.0);
    }

    #[tokio::test]
    async fn test_two_tasks_create_two_run_groups() {
        let bench = TestBench::new(ScriptedRunner::default());
        let req = technique_request(&bench, &["imbalance", "missing"]);
        let run = bench.store.create(req.clone());
        bench.store.update(run.run_id, RunUpdate::running());

        bench.executor.execute(run.run_id, &req).await.unwrap();

        let record = bench.store.get(run.run_id).unwrap();
        assert_eq!(record.status, RunStatus::Completed);
        assert_eq!(discovery::snapshot(&bench.config.runs_dir).len(), 2);

        let agent_calls: Vec<_> = record
            .logs
            .iter()
            .filter_map(|e| e.as_command())
            .filter(|c| ScriptedRunner::stage_of(&c.command) == "agent")
            .collect();
        assert_eq!(agent_calls.len(), 2);
        assert!(agent_calls[0].command.contains(&"imbalance".to_string()));
        assert!(agent_calls[1].command.contains(&"missing".to_string()));

        let main_dir = bench.config.project_root.join(record.run_dir.unwrap());
        let grades: BTreeMap<String, CompetitionGrades> = serde_json::from_str(
            &fs::read_to_string(main_dir.join(TECHNIQUE_GRADES_FILE)).unwrap(),
        )
        .unwrap();

        // Keys are competition ids from directory names, not task ids
        assert_eq!(grades.keys().collect::<Vec<_>>(), vec!["spaceship-titanic"]);
        let merged = &grades["spaceship-titanic"];
        assert!(merged.tasks["imbalance"].passed);
        assert!(merged.tasks["missing"].passed);
        assert_eq!(merged.summary.passed, 2);
        assert_eq!(merged.summary.pass_rate, 1.0);
    }

    #[tokio::test]
    async fn test_first_group_represents_run() {
        let bench = TestBench::new(ScriptedRunner::default());
        let req = technique_request(&bench, &["cv", "scaling"]);
        let run = bench.store.create(req.clone());
        bench.store.update(run.run_id, RunUpdate::running());

        bench.executor.execute(run.run_id, &req).await.unwrap();

        let groups = discovery::snapshot(&bench.config.runs_dir);
        let first = groups.iter().next().unwrap();
        let record = bench.store.get(run.run_id).unwrap();
        assert_eq!(record.run_group.as_ref(), Some(first));
    }

    #[tokio::test]
    async fn test_no_run_groups_is_fatal() {
        let bench = TestBench::new(ScriptedRunner::without_run_groups());
        let req = technique_request(&bench, &["cv"]);
        let run = bench.store.create(req.clone());

        let err = bench.executor.execute(run.run_id, &req).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not find any run groups after technique-task runs"
        );

        let record = bench.store.get(run.run_id).unwrap();
        assert!(matches!(record.logs[1], LogEntry::Stage { .. }));
    }
}
