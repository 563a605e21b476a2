//! Run Repository
//!
//! In-memory store of run records. A single mutex guards the whole map, so
//! every read sees a consistent snapshot and every mutation is atomic.

use chrono::Utc;
use gauntlet_core::domain::log::LogEntry;
use gauntlet_core::domain::run::{RunRecord, RunRequest, RunStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Field overrides applied by [`RunStore::update`]
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct RunUpdate {
    pub status: Option<RunStatus>,
    pub message: Option<String>,
    pub run_group: Option<String>,
    pub run_dir: Option<String>,
}

impl RunUpdate {
    pub fn running() -> Self {
        Self {
            status: Some(RunStatus::Running),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(RunStatus::Failed),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn completed(run_group: impl Into<String>, run_dir: impl Into<String>) -> Self {
        Self {
            status: Some(RunStatus::Completed),
            run_group: Some(run_group.into()),
            run_dir: Some(run_dir.into()),
            ..Default::default()
        }
    }
}

/// Shared run record store
#[derive(Debug, Clone, Default)]
pub struct RunStore {
    records: Arc<Mutex<HashMap<Uuid, RunRecord>>>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, RunRecord>> {
        // No mutation can panic halfway, so a poisoned map is still consistent
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates a queued record for `request`
    pub fn create(&self, request: RunRequest) -> RunRecord {
        let record = RunRecord::queued(request);
        self.lock().insert(record.run_id, record.clone());
        record
    }

    /// Get a snapshot of one record
    pub fn get(&self, id: Uuid) -> Option<RunRecord> {
        self.lock().get(&id).cloned()
    }

    /// List all records, newest first
    pub fn list(&self) -> Vec<RunRecord> {
        let mut records: Vec<RunRecord> = self.lock().values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Apply field overrides to a record
    ///
    /// Unknown ids are ignored. An update whose status change would move the
    /// lifecycle backwards is dropped whole, and `run_group`/`run_dir` are
    /// only written once.
    pub fn update(&self, id: Uuid, update: RunUpdate) {
        let mut records = self.lock();
        let Some(record) = records.get_mut(&id) else {
            tracing::debug!("Ignoring update for unknown run {}", id);
            return;
        };

        if let Some(status) = update.status {
            if !record.status.can_transition_to(status) {
                tracing::warn!(
                    "Refusing update for run {}: {} -> {}",
                    id,
                    record.status,
                    status
                );
                return;
            }
            record.status = status;
        }

        if let Some(message) = update.message {
            record.message = Some(message);
        }

        if let Some(run_group) = update.run_group {
            if record.run_group.is_none() {
                record.run_group = Some(run_group);
            }
        }

        if let Some(run_dir) = update.run_dir {
            if record.run_dir.is_none() {
                record.run_dir = Some(run_dir);
            }
        }

        record.updated_at = Utc::now();
    }

    /// Append one entry to a record's log
    pub fn append_log(&self, id: Uuid, entry: LogEntry) {
        let mut records = self.lock();
        match records.get_mut(&id) {
            Some(record) => {
                record.logs.push(entry);
                record.updated_at = Utc::now();
            }
            None => tracing::debug!("Dropping log entry for unknown run {}", id),
        }
    }
}
