use contracts::usecases::u501_sync_from_sheets::{SyncRunProgress, SyncRunStatus};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory history of sync runs, for `GET /api/sync/runs`
#[derive(Clone)]
pub struct SyncRunTracker {
    runs: Arc<RwLock<HashMap<String, SyncRunProgress>>>,
}

impl SyncRunTracker {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // A panic while holding the lock leaves plain data behind; keep using it
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SyncRunProgress>> {
        self.runs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SyncRunProgress>> {
        self.runs.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new running sync and return its session id
    pub fn start_run(&self, trigger: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.write().insert(
            session_id.clone(),
            SyncRunProgress::new(session_id.clone(), trigger),
        );
        session_id
    }

    pub fn get_run(&self, session_id: &str) -> Option<SyncRunProgress> {
        self.read().get(session_id).cloned()
    }

    /// All known runs, most recent first
    pub fn list_runs(&self) -> Vec<SyncRunProgress> {
        let mut runs: Vec<SyncRunProgress> = self.read().values().cloned().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs
    }

    pub fn is_running(&self) -> bool {
        self.read()
            .values()
            .any(|r| r.status == SyncRunStatus::Running)
    }

    pub fn set_rows(&self, session_id: &str, rows_read: usize, skipped: usize) {
        if let Some(run) = self.write().get_mut(session_id) {
            run.rows_read = rows_read;
            run.skipped = skipped;
        }
    }

    pub fn complete_run(&self, session_id: &str, synced: usize) {
        if let Some(run) = self.write().get_mut(session_id) {
            run.synced = synced;
            run.status = SyncRunStatus::Completed;
            run.completed_at = Some(chrono::Utc::now());
        }
    }

    pub fn fail_run(&self, session_id: &str, message: String) {
        if let Some(run) = self.write().get_mut(session_id) {
            run.status = SyncRunStatus::Failed;
            run.error_message = Some(message);
            run.completed_at = Some(chrono::Utc::now());
        }
    }

    /// Drop finished runs older than `max_age_hours`; running ones stay
    pub fn cleanup_old_runs(&self, max_age_hours: i64) {
        let now = chrono::Utc::now();
        self.write().retain(|_, run| match run.completed_at {
            Some(completed_at) => (now - completed_at).num_hours() < max_age_hours,
            None => true,
        });
    }
}

impl Default for SyncRunTracker {
    fn default() -> Self {
        Self::new()
    }
}
