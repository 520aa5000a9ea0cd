//! Configuration for savio-sync.
//!
//! Deployments drive everything through environment variables (loaded
//! from a `.env` file when present), matching the scheduler/CI contract
//! this tool runs under.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default per-request timeout in seconds. Large pages from the slower
/// endpoints need well over a minute.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Default upsert batch size; 1000 rows balances request count against
/// timeout risk on the target store.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Default sleep between consecutive batch writes.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 500;
/// Default attempts for a failing batch step.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base for exponential backoff between attempts.
pub const DEFAULT_RETRY_BASE_SECS: u64 = 2;
/// Default first-run lookback window in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the remote REST catalog.
    pub base_url: String,
    /// Path to the target SQLite database.
    pub database_path: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Upsert batch size.
    pub batch_size: usize,
    /// Sleep between consecutive batch writes.
    pub rate_limit: Duration,
    /// Attempts per failing batch step.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub retry_base: Duration,
    /// First-run lookback window in days.
    pub lookback_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://gsn.maxapex.net/apex/savio".to_string(),
            database_path: PathBuf::from("savio-sync.db"),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            rate_limit: Duration::from_millis(DEFAULT_RATE_LIMIT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: Duration::from_secs(DEFAULT_RETRY_BASE_SECS),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Settings {
    /// Load settings from the environment, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(url) = env::var("SAVIO_BASE_URL") {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = env_parse::<PathBuf>("DATABASE_PATH") {
            settings.database_path = path;
        }
        if let Some(secs) = env_parse::<u64>("REQUEST_TIMEOUT") {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = env_parse::<usize>("BATCH_SIZE") {
            settings.batch_size = size.max(1);
        }
        if let Some(ms) = env_parse::<u64>("RATE_LIMIT_MS") {
            settings.rate_limit = Duration::from_millis(ms);
        }
        if let Some(n) = env_parse::<u32>("MAX_RETRIES") {
            settings.max_retries = n.max(1);
        }
        if let Some(secs) = env_parse::<u64>("RETRY_BASE_SECS") {
            settings.retry_base = Duration::from_secs(secs);
        }
        if let Some(days) = env_parse::<u32>("LOOKBACK_DAYS") {
            settings.lookback_days = days;
        }

        settings
    }
}
