use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use contracts::domain::a001_ticket::{Ticket, TicketField};
use contracts::usecases::u501_sync_from_sheets::SyncResponse;
use tokio::sync::{Mutex, MutexGuard};

use super::column_mapper::ColumnMap;
use super::error::SyncError;
use super::progress_tracker::SyncRunTracker;
use super::row_normalizer::normalize_row;
use super::sheets_api_client::{CellValue, SheetSource, SheetsApiClient};
use crate::dashboards::d400_helpdesk_summary::SummaryCache;
use crate::domain::a001_ticket::{StoreConnector, TicketStore};
use crate::shared::config::{Credentials, SheetsConfig};

/// Finished runs are kept this long in the history
const RUN_HISTORY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Manual,
    Scheduler,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Manual => "manual",
            SyncTrigger::Scheduler => "scheduler",
        }
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters of one successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The sheet had no rows at all, not even a header
    pub empty_sheet: bool,
    /// Data rows below the header
    pub rows_read: usize,
    /// Rows dropped for lack of an identifier
    pub skipped: usize,
    /// Earlier rows overridden by a later row with the same identifier
    pub duplicates: usize,
    /// Records sent to the destination
    pub synced: usize,
}

impl SyncOutcome {
    pub fn to_response(&self) -> SyncResponse {
        if self.empty_sheet {
            SyncResponse::empty_sheet()
        } else {
            SyncResponse::completed(self.synced)
        }
    }
}

/// One full pass: fetch the sheet, map the header, normalize every data row
/// and upsert the result in a single bulk write. Any failure aborts the run
/// before or instead of the write.
pub async fn run_sync(
    source: &dyn SheetSource,
    store: &dyn TicketStore,
) -> Result<SyncOutcome, SyncError> {
    let rows = source.fetch_rows().await?;

    let Some((header, data)) = rows.split_first() else {
        tracing::info!("Sheet is empty, nothing to sync");
        return Ok(SyncOutcome {
            empty_sheet: true,
            ..SyncOutcome::default()
        });
    };

    let headers: Vec<String> = header.iter().map(CellValue::as_text).collect();
    let columns = ColumnMap::from_headers(&headers);
    tracing::info!("Mapped headers: {}", columns);
    if columns.get(TicketField::TicketId).is_none() {
        tracing::warn!("No ticket id column in header {:?}; every row will be skipped", headers);
    }
    let missing = columns.missing_fields();
    if !missing.is_empty() {
        tracing::info!("Columns not found in sheet, left null: {:?}", missing);
    }

    let tickets: Vec<Ticket> = data
        .iter()
        .filter_map(|row| normalize_row(row, &columns))
        .collect();
    let valid = tickets.len();
    let tickets = dedupe_keep_last(tickets);

    let outcome = SyncOutcome {
        empty_sheet: false,
        rows_read: data.len(),
        skipped: data.len() - valid,
        duplicates: valid - tickets.len(),
        synced: 0,
    };
    tracing::info!(
        "Processed {} valid tickets ({} rows skipped, {} duplicate ids)",
        tickets.len(),
        outcome.skipped,
        outcome.duplicates
    );

    if tickets.is_empty() {
        return Ok(outcome);
    }

    let synced = store.upsert_tickets(&tickets).await?;
    tracing::info!("Upsert into {} done: {} records", store.backend_name(), synced);

    Ok(SyncOutcome { synced, ..outcome })
}

/// A bulk upsert may not touch the same key twice; the last row wins,
/// at the position of its last occurrence
fn dedupe_keep_last(tickets: Vec<Ticket>) -> Vec<Ticket> {
    let mut last_index: HashMap<String, usize> = HashMap::with_capacity(tickets.len());
    for (index, ticket) in tickets.iter().enumerate() {
        last_index.insert(ticket.ticket_id.clone(), index);
    }
    if last_index.len() == tickets.len() {
        return tickets;
    }

    tickets
        .into_iter()
        .enumerate()
        .filter(|(index, ticket)| last_index.get(&ticket.ticket_id) == Some(index))
        .map(|(_, ticket)| ticket)
        .collect()
}

/// Message recorded for a run whose caller went away before it finished
const RUN_CANCELLED: &str = "Sincronização cancelada antes de terminar";

/// Closes the history entry when a run future is dropped mid-flight
/// (client disconnect, aborted task). Disarmed once the run reports back.
struct RunGuard<'a> {
    tracker: &'a SyncRunTracker,
    session_id: String,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(tracker: &'a SyncRunTracker, session_id: String) -> Self {
        Self {
            tracker,
            session_id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.tracker
                .fail_run(&self.session_id, RUN_CANCELLED.to_string());
            tracing::warn!("Sync {} cancelled before finishing", self.session_id);
        }
    }
}

/// Runs syncs one at a time and records each in the run history
pub struct SyncExecutor {
    sheets: SheetsConfig,
    credentials: Credentials,
    http: reqwest::Client,
    stores: Arc<StoreConnector>,
    summary_cache: Arc<SummaryCache>,
    pub tracker: Arc<SyncRunTracker>,
    run_lock: Mutex<()>,
}

impl SyncExecutor {
    pub fn new(
        sheets: SheetsConfig,
        credentials: Credentials,
        http: reqwest::Client,
        stores: Arc<StoreConnector>,
        summary_cache: Arc<SummaryCache>,
        tracker: Arc<SyncRunTracker>,
    ) -> Self {
        Self {
            sheets,
            credentials,
            http,
            stores,
            summary_cache,
            tracker,
            run_lock: Mutex::new(()),
        }
    }

    /// Sync against the configured spreadsheet and datastore, waiting for
    /// any run in flight to finish first
    pub async fn execute(&self, trigger: SyncTrigger) -> Result<SyncOutcome, SyncError> {
        let lock = self.run_lock.lock().await;
        self.tracked(lock, trigger, self.configured_run()).await
    }

    /// Like [`execute`](Self::execute), but returns `None` at once when a
    /// run is already in flight
    pub async fn try_execute(&self, trigger: SyncTrigger) -> Option<Result<SyncOutcome, SyncError>> {
        let lock = self.run_lock.try_lock().ok()?;
        Some(self.tracked(lock, trigger, self.configured_run()).await)
    }

    /// Sync with an explicit source and store
    pub async fn execute_with(
        &self,
        source: &dyn SheetSource,
        store: &dyn TicketStore,
        trigger: SyncTrigger,
    ) -> Result<SyncOutcome, SyncError> {
        let lock = self.run_lock.lock().await;
        self.tracked(lock, trigger, run_sync(source, store)).await
    }

    /// Missing settings abort the run before any network call
    async fn configured_run(&self) -> Result<SyncOutcome, SyncError> {
        let credentials = self.credentials.require_sync()?;
        let source = SheetsApiClient::new(
            self.http.clone(),
            &self.sheets,
            &credentials.spreadsheet_id,
            &credentials.google_api_key,
        );
        let store = self.stores.connect(&credentials.datastore).await?;
        run_sync(&source, store.as_ref()).await
    }

    async fn tracked<F>(
        &self,
        _lock: MutexGuard<'_, ()>,
        trigger: SyncTrigger,
        run: F,
    ) -> Result<SyncOutcome, SyncError>
    where
        F: Future<Output = Result<SyncOutcome, SyncError>>,
    {
        self.tracker.cleanup_old_runs(RUN_HISTORY_HOURS);
        let session_id = self.tracker.start_run(trigger.as_str());
        let mut guard = RunGuard::new(&self.tracker, session_id.clone());
        tracing::info!("Sync {} started ({})", session_id, trigger);

        let result = run.await;
        guard.disarm();

        match &result {
            Ok(outcome) => {
                self.tracker
                    .set_rows(&session_id, outcome.rows_read, outcome.skipped);
                self.tracker.complete_run(&session_id, outcome.synced);
                if outcome.synced > 0 {
                    self.summary_cache.invalidate();
                }
                tracing::info!("Sync {} completed: {} records", session_id, outcome.synced);
            }
            Err(e) => {
                self.tracker.fail_run(&session_id, e.to_string());
                tracing::error!("Sync {} failed: {}", session_id, e);
            }
        }

        result
    }
}
