use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of one sync run, manual or scheduled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRunProgress {
    pub session_id: String,
    pub status: SyncRunStatus,
    /// "manual" or "scheduler"
    pub trigger: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Data rows read from the sheet (header excluded)
    pub rows_read: usize,
    /// Records written to the destination
    pub synced: usize,
    /// Rows dropped for lack of an identifier
    pub skipped: usize,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunStatus {
    Running,
    Completed,
    Failed,
}

impl SyncRunProgress {
    pub fn new(session_id: String, trigger: impl Into<String>) -> Self {
        Self {
            session_id,
            status: SyncRunStatus::Running,
            trigger: trigger.into(),
            started_at: Utc::now(),
            completed_at: None,
            rows_read: 0,
            synced: 0,
            skipped: 0,
            error_message: None,
        }
    }
}
