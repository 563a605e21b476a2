//! Run dispatcher
//!
//! Each accepted run gets its own task. With a concurrency cap configured,
//! a run waits for a permit and stays queued until it gets one.

use gauntlet_core::domain::run::RunRequest;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::pipeline::{PipelineError, RunExecutor};
use crate::repository::{RunStore, RunUpdate};

/// Dispatches runs to detached workers
#[derive(Clone)]
pub struct RunScheduler {
    store: RunStore,
    executor: Arc<RunExecutor>,
    semaphore: Option<Arc<Semaphore>>,
}

impl RunScheduler {
    /// Creates a scheduler; `max_concurrent_runs == 0` means unbounded
    pub fn new(store: RunStore, executor: Arc<RunExecutor>, max_concurrent_runs: usize) -> Self {
        let semaphore =
            (max_concurrent_runs > 0).then(|| Arc::new(Semaphore::new(max_concurrent_runs)));
        Self {
            store,
            executor,
            semaphore,
        }
    }

    /// Starts a worker for a queued run and returns immediately
    pub fn dispatch(&self, run_id: Uuid, request: RunRequest) -> JoinHandle<()> {
        let store = self.store.clone();
        let executor = Arc::clone(&self.executor);
        let semaphore = self.semaphore.clone();

        tokio::spawn(async move {
            let _permit = match Self::acquire(semaphore, run_id).await {
                Ok(permit) => permit,
                Err(message) => {
                    error!("Run {}: {}", run_id, message);
                    store.update(run_id, RunUpdate::failed(message));
                    return;
                }
            };

            info!("Run {} started", run_id);
            store.update(run_id, RunUpdate::running());

            // Inner task so a panicking pipeline still fails the run
            let worker = tokio::spawn(async move { executor.execute(run_id, &request).await });

            match worker.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    match &e {
                        PipelineError::StageFailed { command, .. } => {
                            error!("Run {} failed running `{}`: {}", run_id, command, e)
                        }
                        _ => error!("Run {} failed: {}", run_id, e),
                    }
                    store.update(run_id, RunUpdate::failed(e.to_string()));
                }
                Err(e) => {
                    error!("Run {} worker panicked: {}", run_id, e);
                    store.update(run_id, RunUpdate::failed("worker panicked"));
                }
            }
            // Permit is released when dropped
        })
    }

    async fn acquire(
        semaphore: Option<Arc<Semaphore>>,
        run_id: Uuid,
    ) -> Result<Option<OwnedSemaphorePermit>, String> {
        let Some(semaphore) = semaphore else {
            return Ok(None);
        };

        debug!(
            "Run {} waiting for a worker slot ({} free)",
            run_id,
            semaphore.available_permits()
        );
        semaphore
            .acquire_owned()
            .await
            .map(Some)
            .map_err(|e| format!("scheduler closed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedRunner, TestBench};
    use gauntlet_core::domain::run::RunStatus;
    use std::time::Duration;

    fn scheduler(bench: &TestBench, max_concurrent_runs: usize) -> RunScheduler {
        RunScheduler::new(
            bench.store.clone(),
            Arc::clone(&bench.executor),
            max_concurrent_runs,
        )
    }

    #[tokio::test]
    async fn test_lite_run_queued_then_completed() {
        let bench = TestBench::new(ScriptedRunner::default());
        let scheduler = scheduler(&bench, 0);

        let run = bench.store.create(bench.request());
        assert_eq!(run.status, RunStatus::Queued);

        scheduler.dispatch(run.run_id, run.request.clone()).await.unwrap();

        let record = bench.store.get(run.run_id).unwrap();
        assert_eq!(record.status, RunStatus::Completed);
        assert!(record.run_group.is_some());
        assert!(record.message.is_none());
    }

    #[tokio::test]
    async fn test_failed_prepare_fails_run() {
        let bench = TestBench::new(ScriptedRunner::failing("prepare", 1, "disk full"));
        let scheduler = scheduler(&bench, 0);

        let run = bench.store.create(bench.request());
        scheduler.dispatch(run.run_id, run.request.clone()).await.unwrap();

        let record = bench.store.get(run.run_id).unwrap();
        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.message.as_deref(), Some("disk full"));
        assert_eq!(record.logs.len(), 1);
        assert_eq!(record.logs[0].as_command().unwrap().exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_capped_run_stays_queued_while_waiting() {
        let bench = TestBench::new(ScriptedRunner::slow(Duration::from_millis(200)));
        let scheduler = scheduler(&bench, 1);

        let first = bench.store.create(bench.request());
        let second = bench.store.create(bench.request());
        let first_handle = scheduler.dispatch(first.run_id, first.request.clone());
        let second_handle = scheduler.dispatch(second.run_id, second.request.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        let statuses = [
            bench.store.get(first.run_id).unwrap().status,
            bench.store.get(second.run_id).unwrap().status,
        ];
        assert!(statuses.contains(&RunStatus::Running));
        assert!(statuses.contains(&RunStatus::Queued));

        first_handle.await.unwrap();
        second_handle.await.unwrap();
        assert!(bench.store.list().iter().all(|r| r.status.is_terminal()));
    }
}
