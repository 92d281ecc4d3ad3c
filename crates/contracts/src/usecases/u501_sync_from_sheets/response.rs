use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Successful sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    /// Number of records sent to the destination table
    pub synced: usize,
    pub timestamp: DateTime<Utc>,
}

impl SyncResponse {
    pub fn completed(synced: usize) -> Self {
        Self {
            success: true,
            message: "Sincronização concluída com sucesso".to_string(),
            synced,
            timestamp: Utc::now(),
        }
    }

    pub fn empty_sheet() -> Self {
        Self {
            success: true,
            message: "Planilha vazia".to_string(),
            synced: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Aborted sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailureResponse {
    pub success: bool,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl SyncFailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of a 401 answer to a caller without the service credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnauthorizedResponse {
    pub error: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            error: "Unauthorized - Use service_role key".to_string(),
        }
    }
}
