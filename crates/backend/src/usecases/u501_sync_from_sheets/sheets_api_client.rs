use async_trait::async_trait;
use serde::Deserialize;

use super::error::SyncError;
use crate::shared::config::SheetsConfig;

/// One cell as returned by the values endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl CellValue {
    /// Cell rendered as text; integral numbers print without a fraction
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Raw grid of a spreadsheet: first row is the header
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<Vec<CellValue>>, SyncError>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<CellValue>>>,
}

/// Read-only client for the Google Sheets v4 values endpoint, keyed by API key
pub struct SheetsApiClient {
    client: reqwest::Client,
    api_base: String,
    range: String,
    spreadsheet_id: String,
    api_key: String,
}

impl SheetsApiClient {
    pub fn new(
        client: reqwest::Client,
        config: &SheetsConfig,
        spreadsheet_id: &str,
        api_key: &str,
    ) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            range: config.range.clone(),
            spreadsheet_id: spreadsheet_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn values_url(&self) -> String {
        format!(
            "{}/{}/values/{}?key={}",
            self.api_base,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&self.range),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl SheetSource for SheetsApiClient {
    async fn fetch_rows(&self) -> Result<Vec<Vec<CellValue>>, SyncError> {
        tracing::info!(
            "Sheets API: GET spreadsheet {} range {}",
            self.spreadsheet_id,
            self.range
        );

        let response = self.client.get(self.values_url()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Sheets API response: {}", status);
            return Err(SyncError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| SyncError::UpstreamDecode(e.without_url().to_string()))?;

        // The API omits `values` entirely for an empty range
        let rows = range.values.unwrap_or_default();
        tracing::info!("Sheets API: got {} rows", rows.len());
        Ok(rows)
    }
}
