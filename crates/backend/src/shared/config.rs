use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    /// Base URL of the Sheets v4 API, without trailing slash
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
    /// Cell range read on every sync
    #[serde(default = "default_sheets_range")]
    pub range: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Six-field cron expression (sec min hour day month weekday)
    #[serde(default = "default_cron")]
    pub cron: String,
    /// User-Agent that identifies the internal scheduler to `/api/sync`
    #[serde(default = "default_scheduler_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_table_limit")]
    pub table_limit: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_sheets_range() -> String {
    "A1:ZZ".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_cron() -> String {
    "0 0 * * * *".to_string()
}

fn default_scheduler_agent() -> String {
    "pg_cron".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_table_limit() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base: default_sheets_api_base(),
            range: default_sheets_range(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron: default_cron(),
            user_agent: default_scheduler_agent(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            table_limit: default_table_limit(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[sheets]
api_base = "https://sheets.googleapis.com/v4/spreadsheets"
range = "A1:ZZ"
timeout_secs = 120

[scheduler]
enabled = false
cron = "0 0 * * * *"
user_agent = "pg_cron"

[dashboard]
cache_ttl_secs = 300
table_limit = 100
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. Next to the executable
/// 2. Current working directory
/// 3. Embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    for config_path in candidate_paths() {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        }
        tracing::debug!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("config.toml"));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config.toml"));
    }
    paths
}

// ============================================================================
// Credentials (environment only, never in config.toml)
// ============================================================================

pub const ENV_DATASTORE_URL: &str = "SUPABASE_URL";
pub const ENV_DATASTORE_KEY: &str = "SERVICE_ROLE_KEY";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_SPREADSHEET_ID: &str = "GOOGLE_SHEETS_ID";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Faltando {} nas env vars", .0.join(", "))]
pub struct MissingCredentials(pub Vec<&'static str>);

/// Snapshot of the secret settings taken from the environment at startup.
/// Each value is optional here; operations that need them call one of the
/// `require_*` methods and abort when something is missing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    datastore_url: Option<String>,
    datastore_key: Option<String>,
    google_api_key: Option<String>,
    spreadsheet_id: Option<String>,
}

/// Everything a sync run needs
#[derive(Debug, Clone)]
pub struct SyncCredentials {
    pub datastore: DatastoreCredentials,
    pub google_api_key: String,
    pub spreadsheet_id: String,
}

#[derive(Debug, Clone)]
pub struct DatastoreCredentials {
    pub url: String,
    pub key: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            datastore_url: get(ENV_DATASTORE_URL),
            datastore_key: get(ENV_DATASTORE_KEY),
            google_api_key: get(ENV_GOOGLE_API_KEY),
            spreadsheet_id: get(ENV_SPREADSHEET_ID),
        }
    }

    /// Secret a manual caller must present to trigger a sync
    pub fn service_secret(&self) -> Option<&str> {
        self.datastore_key.as_deref()
    }

    pub fn require_sync(&self) -> Result<SyncCredentials, MissingCredentials> {
        let missing: Vec<&'static str> = self
            .presence()
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(MissingCredentials(missing));
        }

        let datastore = self.require_datastore()?;
        Ok(SyncCredentials {
            datastore,
            google_api_key: self.google_api_key.clone().unwrap_or_default(),
            spreadsheet_id: self.spreadsheet_id.clone().unwrap_or_default(),
        })
    }

    pub fn require_datastore(&self) -> Result<DatastoreCredentials, MissingCredentials> {
        match (&self.datastore_url, &self.datastore_key) {
            (Some(url), Some(key)) => Ok(DatastoreCredentials {
                url: url.clone(),
                key: key.clone(),
            }),
            (url, key) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(ENV_DATASTORE_URL);
                }
                if key.is_none() {
                    missing.push(ENV_DATASTORE_KEY);
                }
                Err(MissingCredentials(missing))
            }
        }
    }

    /// Which variables are set, by name (values are never exposed)
    pub fn presence(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            (ENV_DATASTORE_URL, self.datastore_url.is_some()),
            (ENV_DATASTORE_KEY, self.datastore_key.is_some()),
            (ENV_GOOGLE_API_KEY, self.google_api_key.is_some()),
            (ENV_SPREADSHEET_ID, self.spreadsheet_id.is_some()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sheets.range, "A1:ZZ");
        assert_eq!(config.scheduler.user_agent, "pg_cron");
        assert_eq!(config.dashboard.table_limit, 100);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[scheduler]\nenabled = true\n").unwrap();
        assert!(config.scheduler.enabled);
        assert_eq!(config.scheduler.cron, "0 0 * * * *");
        assert_eq!(config.dashboard.cache_ttl_secs, 300);
        assert_eq!(
            config.sheets.api_base,
            "https://sheets.googleapis.com/v4/spreadsheets"
        );
    }

    #[test]
    fn test_require_sync_lists_every_missing_variable() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (ENV_DATASTORE_URL, "https://db.example"),
            (ENV_GOOGLE_API_KEY, "   "),
        ]));
        let err = creds.require_sync().unwrap_err();
        assert_eq!(
            err.0,
            vec![ENV_GOOGLE_API_KEY, ENV_SPREADSHEET_ID, ENV_DATASTORE_KEY]
        );
        assert!(err.to_string().contains(ENV_SPREADSHEET_ID));
    }

    #[test]
    fn test_require_sync_ok() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (ENV_DATASTORE_URL, "https://db.example"),
            (ENV_DATASTORE_KEY, "secret"),
            (ENV_GOOGLE_API_KEY, "gkey"),
            (ENV_SPREADSHEET_ID, "sheet-1"),
        ]));
        let sync = creds.require_sync().unwrap();
        assert_eq!(sync.datastore.url, "https://db.example");
        assert_eq!(sync.spreadsheet_id, "sheet-1");
        assert_eq!(creds.service_secret(), Some("secret"));
    }

    #[test]
    fn test_require_datastore_only_needs_two_variables() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (ENV_DATASTORE_URL, "sqlite::memory:"),
            (ENV_DATASTORE_KEY, "k"),
        ]));
        assert!(creds.require_datastore().is_ok());
        assert!(creds.require_sync().is_err());
    }
}
