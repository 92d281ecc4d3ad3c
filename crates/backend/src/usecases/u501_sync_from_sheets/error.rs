use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::a001_ticket::StoreError;
use crate::shared::config::MissingCredentials;

/// Terminal failure of a sync run. Row-level problems are never errors:
/// they degrade to null fields or a skipped row.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Unauthorized - Use service_role key")]
    Unauthorized,

    #[error(transparent)]
    Config(#[from] MissingCredentials),

    /// Sheets API answered with a non-success status
    #[error("Erro ao buscar Google Sheets: {status} - {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Built through `From`, which drops the request URL (it carries the API key)
    #[error("Erro ao buscar Google Sheets: {0}")]
    UpstreamTransport(reqwest::Error),

    #[error("Erro ao ler resposta do Google Sheets: {0}")]
    UpstreamDecode(String),

    #[error("Erro ao fazer upsert: {0}")]
    Write(#[from] StoreError),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::UpstreamTransport(e.without_url())
    }
}

impl SyncError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            SyncError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
