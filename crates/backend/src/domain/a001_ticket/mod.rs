pub mod postgrest;
pub mod repository;
pub mod store;

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::shared::config::DatastoreCredentials;
use crate::shared::data::db::open_sqlite;

pub use postgrest::PostgrestTicketStore;
pub use repository::SqliteTicketStore;
pub use store::{StoreDescription, StoreError, TicketStore};

/// `SUPABASE_URL` values that point at a local SQLite file instead of PostgREST
pub fn is_sqlite_url(url: &str) -> bool {
    url.starts_with("sqlite:")
}

/// Builds the ticket store for a datastore URL.
///
/// PostgREST stores are cheap and built per call. The SQLite store is opened
/// once and shared, so an in-memory database keeps its rows between runs.
pub struct StoreConnector {
    http: reqwest::Client,
    sqlite: OnceCell<Arc<SqliteTicketStore>>,
}

impl StoreConnector {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            sqlite: OnceCell::new(),
        }
    }

    pub async fn connect(
        &self,
        datastore: &DatastoreCredentials,
    ) -> Result<Arc<dyn TicketStore>, StoreError> {
        if is_sqlite_url(&datastore.url) {
            let store = self
                .sqlite
                .get_or_try_init(|| async {
                    let db = open_sqlite(&datastore.url).await?;
                    Ok::<_, StoreError>(Arc::new(SqliteTicketStore::new(db)))
                })
                .await?;
            return Ok(store.clone());
        }

        Ok(Arc::new(PostgrestTicketStore::new(
            self.http.clone(),
            &datastore.url,
            &datastore.key,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_ticket::Ticket;

    fn creds(url: &str) -> DatastoreCredentials {
        DatastoreCredentials {
            url: url.to_string(),
            key: "k".to_string(),
        }
    }

    #[test]
    fn test_is_sqlite_url() {
        assert!(is_sqlite_url("sqlite::memory:"));
        assert!(is_sqlite_url("sqlite://data/app.db"));
        assert!(!is_sqlite_url("https://abc.supabase.co"));
    }

    #[tokio::test]
    async fn test_connect_picks_backend_by_url() {
        let connector = StoreConnector::new(reqwest::Client::new());
        let remote = connector.connect(&creds("https://abc.supabase.co")).await.unwrap();
        assert_eq!(remote.backend_name(), "postgrest");

        let local = connector.connect(&creds("sqlite::memory:")).await.unwrap();
        assert_eq!(local.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn test_sqlite_store_is_shared_between_connects() {
        let connector = StoreConnector::new(reqwest::Client::new());
        let first = connector.connect(&creds("sqlite::memory:")).await.unwrap();
        first.upsert_tickets(&[Ticket::new("TH0001")]).await.unwrap();

        let second = connector.connect(&creds("sqlite::memory:")).await.unwrap();
        assert_eq!(second.list_tickets().await.unwrap().len(), 1);
    }
}
