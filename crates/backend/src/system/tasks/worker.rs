use anyhow::Result;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::usecases::u501_sync_from_sheets::{SyncError, SyncExecutor, SyncOutcome, SyncTrigger};

/// Background worker firing the sheet sync on a cron schedule
pub struct SyncScheduler {
    executor: Arc<SyncExecutor>,
    expression: String,
    schedule: Schedule,
}

impl SyncScheduler {
    pub fn new(executor: Arc<SyncExecutor>, expression: &str) -> Result<Self> {
        let schedule = Schedule::from_str(expression)
            .map_err(|e| anyhow::anyhow!("Invalid cron expression '{}': {}", expression, e))?;
        Ok(Self {
            executor,
            expression: expression.to_string(),
            schedule,
        })
    }

    pub fn next_run_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// Sleeps until each fire time, then runs one sync. Never returns unless
    /// the schedule has no upcoming time.
    pub async fn run_loop(&self) {
        info!("Sync scheduler started with cron '{}'", self.expression);

        loop {
            let now = Utc::now();
            let Some(next) = self.next_run_after(now) else {
                warn!("Cron '{}' has no upcoming fire time, scheduler stopped", self.expression);
                return;
            };
            info!("Next scheduled sync at {}", next.format("%Y-%m-%d %H:%M:%S UTC"));

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            self.tick().await;
        }
    }

    /// Run one scheduled sync; `None` when a run is already in flight
    pub async fn tick(&self) -> Option<Result<SyncOutcome, SyncError>> {
        let Some(result) = self.executor.try_execute(SyncTrigger::Scheduler).await else {
            warn!("Previous sync still running, skipping scheduled tick");
            return None;
        };

        match &result {
            Ok(outcome) => info!(
                "Scheduled sync finished: {} synced, {} skipped",
                outcome.synced, outcome.skipped
            ),
            Err(e) => error!("Scheduled sync failed: {}", e),
        }
        Some(result)
    }
}
