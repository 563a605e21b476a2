//! Shared application state
//!
//! Owned by the router and cloned into every handler. Workers receive the
//! store through the scheduler.

use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::{CommandRunner, RunExecutor};
use crate::repository::RunStore;
use crate::scheduler::RunScheduler;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: RunStore,
    pub scheduler: RunScheduler,
}

impl AppState {
    /// Builds a fresh store and scheduler running pipelines through `runner`
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let store = RunStore::new();
        let executor = Arc::new(RunExecutor::new(&config, store.clone(), runner));
        Self::from_parts(config, store, executor)
    }

    pub fn from_parts(config: Config, store: RunStore, executor: Arc<RunExecutor>) -> Self {
        let scheduler = RunScheduler::new(store.clone(), executor, config.max_concurrent_runs);
        Self {
            config: Arc::new(config),
            store,
            scheduler,
        }
    }
}
