use async_trait::async_trait;
use contracts::domain::a001_ticket::Ticket;
use thiserror::Error;

/// Destination table for synced tickets
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Short name for logs and diagnostics ("postgrest", "sqlite")
    fn backend_name(&self) -> &'static str;

    /// Insert-or-update all tickets keyed by `id_chamado`, as one atomic
    /// operation. Returns the number of tickets written.
    async fn upsert_tickets(&self, tickets: &[Ticket]) -> Result<usize, StoreError>;

    /// Every ticket in the table
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Row count and column names, for the diagnostics endpoint
    async fn describe(&self) -> Result<StoreDescription, StoreError>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoreDescription {
    pub backend: &'static str,
    pub row_count: u64,
    pub columns: Vec<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The datastore answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    #[error("falha de rede: {0}")]
    Transport(reqwest::Error),

    #[error("{0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("resposta inválida: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.without_url())
    }
}
