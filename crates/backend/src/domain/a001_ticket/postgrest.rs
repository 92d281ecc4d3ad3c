use async_trait::async_trait;
use contracts::domain::a001_ticket::{Ticket, TicketField};
use reqwest::RequestBuilder;

use super::store::{StoreDescription, StoreError, TicketStore};

const TABLE: &str = "chamados";
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Tickets table behind a PostgREST endpoint (Supabase `/rest/v1`)
pub struct PostgrestTicketStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl PostgrestTicketStore {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[cfg(test)]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    /// Service-role key goes in both headers, as Supabase expects
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rejected(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        // PostgREST errors look like {"code": "...", "message": "..."}
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);
        StoreError::Rejected { status, message }
    }
}

#[async_trait]
impl TicketStore for PostgrestTicketStore {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    async fn upsert_tickets(&self, tickets: &[Ticket]) -> Result<usize, StoreError> {
        if tickets.is_empty() {
            return Ok(0);
        }

        let url = format!(
            "{}?on_conflict={}",
            self.table_url(),
            TicketField::TicketId.column_name()
        );
        tracing::debug!("PostgREST: POST {} ({} rows)", url, tickets.len());

        // A single INSERT ... ON CONFLICT DO UPDATE statement: Postgres applies
        // it entirely or not at all.
        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(tickets)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        Ok(tickets.len())
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets = Vec::new();
        let mut offset = 0usize;

        loop {
            let url = format!(
                "{}?select=*&order={}.asc&limit={}&offset={}",
                self.table_url(),
                TicketField::TicketId.column_name(),
                self.page_size,
                offset
            );
            let response = self.authorized(self.client.get(&url)).send().await?;
            if !response.status().is_success() {
                return Err(Self::rejected(response).await);
            }

            let page: Vec<Ticket> = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.without_url().to_string()))?;
            let page_len = page.len();
            tickets.extend(page);

            if page_len < self.page_size {
                break;
            }
            offset += page_len;
        }

        Ok(tickets)
    }

    async fn describe(&self) -> Result<StoreDescription, StoreError> {
        let url = format!("{}?select=*&limit=1", self.table_url());
        let response = self
            .authorized(self.client.get(&url))
            .header("Prefer", "count=exact")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        let rows: Vec<serde_json::Map<String, serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.without_url().to_string()))?;
        let columns = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();

        Ok(StoreDescription {
            backend: self.backend_name(),
            row_count: total.unwrap_or(rows.len() as u64),
            columns,
        })
    }
}

/// "0-0/57" → 57, "*/0" → 0, "0-9/*" → None
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}
