use std::sync::Arc;
use std::time::Duration;

use crate::dashboards::d400_helpdesk_summary::SummaryCache;
use crate::domain::a001_ticket::StoreConnector;
use crate::shared::config::{Config, Credentials};
use crate::usecases::u501_sync_from_sheets::{SyncExecutor, SyncRunTracker};

/// Everything the handlers, middleware and scheduler share
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Arc<Credentials>,
    pub stores: Arc<StoreConnector>,
    pub executor: Arc<SyncExecutor>,
    pub summary_cache: Arc<SummaryCache>,
}

impl AppState {
    pub fn new(config: Config, credentials: Credentials) -> anyhow::Result<Self> {
        let http = build_http_client(&config)?;
        let stores = Arc::new(StoreConnector::new(http.clone()));
        let summary_cache = Arc::new(SummaryCache::new(Duration::from_secs(
            config.dashboard.cache_ttl_secs,
        )));
        let executor = Arc::new(SyncExecutor::new(
            config.sheets.clone(),
            credentials.clone(),
            http,
            stores.clone(),
            summary_cache.clone(),
            Arc::new(SyncRunTracker::new()),
        ));

        Ok(Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            stores,
            executor,
            summary_cache,
        })
    }
}

fn build_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.sheets.timeout_secs))
        .user_agent(concat!("techhelp-backend/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))
}
