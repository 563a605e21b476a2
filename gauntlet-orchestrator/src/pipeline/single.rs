//! Single-task pipeline: prepare, agent, submission, grade

use gauntlet_core::domain::run::RunRequest;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::RunExecutor;
use crate::pipeline::discovery;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::repository::RunUpdate;

impl RunExecutor {
    pub(super) async fn run_single(&self, run_id: Uuid, req: &RunRequest) -> PipelineResult<()> {
        info!("Run {}: preparing {}", run_id, req.competition_set);
        self.invoker
            .invoke(run_id, &self.toolchain.prepare(req))
            .await?;

        info!("Run {}: executing agent '{}'", run_id, req.agent_id);
        let before = discovery::snapshot(&self.runs_dir);
        {
            let competition_set = self.private_competition_set(&req.competition_set)?;
            let command = self.toolchain.run_agent(req, competition_set.path(), None);
            self.invoker.invoke(run_id, &command).await?;
        }

        let run_group = discovery::discover(&self.runs_dir, &before).ok_or_else(|| {
            PipelineError::DiscoveryFailed(
                "could not find new run group after agent run".to_string(),
            )
        })?;
        let group_dir = self.runs_dir.join(&run_group);
        info!("Run {}: agent created run group {}", run_id, run_group);

        let submission = group_dir.join("submission.jsonl");
        self.invoker
            .invoke(
                run_id,
                &self
                    .toolchain
                    .make_submission(&group_dir.join("metadata.json"), &submission),
            )
            .await?;

        info!("Run {}: grading {}", run_id, submission.display());
        self.invoker
            .invoke(
                run_id,
                &self
                    .toolchain
                    .grade(req, &submission, &group_dir.join("grading")),
            )
            .await?;

        self.store.update(
            run_id,
            RunUpdate::completed(&run_group, self.display_path(&group_dir)),
        );
        info!("Run {} completed in {}", run_id, group_dir.display());

        Ok(())
    }
}
