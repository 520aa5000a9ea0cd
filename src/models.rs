//! Domain types shared across the sync pipeline.

use std::fmt;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

/// A record as returned by the remote endpoint: an open field mapping
/// whose keys vary in presence across records of the same source.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Static per-source configuration, fixed at compile time.
#[derive(Debug, Clone, Copy)]
pub struct SourceDescriptor {
    /// Short name used by the CLI and in logs.
    pub name: &'static str,
    /// Collection path relative to the base URL (no time filter).
    pub endpoint: &'static str,
    /// Time-filtered path taking `/{YYYYMMDD}/{YYYYMMDD}` segments,
    /// or `None` when the endpoint cannot be filtered by modification time.
    pub period_endpoint: Option<&'static str>,
    /// Target table name.
    pub table: &'static str,
    /// Ordered fields joined into the stable record id.
    pub key_fields: &'static [&'static str],
    /// Records requested per page.
    pub page_size: u32,
    /// First-run lookback window in days.
    pub lookback_days: u32,
}

impl SourceDescriptor {
    /// Whether the remote endpoint can be constrained by modification time.
    pub fn supports_time_filter(&self) -> bool {
        self.period_endpoint.is_some()
    }
}

/// Extraction mode resolved per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Entire collection, no time filter.
    Full,
    /// Lower bound derived from the target's high-water mark.
    Incremental,
    /// No prior state: bounded lookback window instead of full history.
    FirstRun,
    /// Caller-supplied explicit date range.
    Manual,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Full => "full",
            SyncMode::Incremental => "incremental",
            SyncMode::FirstRun => "first-run",
            SyncMode::Manual => "manual",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved extraction bounds for one run. Bounds are `None` for full
/// extractions; `hasta` is always set when `desde` is.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncWindow {
    pub mode: SyncMode,
    pub desde: Option<NaiveDateTime>,
    pub hasta: Option<NaiveDateTime>,
}

impl SyncWindow {
    pub fn full(mode: SyncMode) -> Self {
        Self {
            mode,
            desde: None,
            hasta: None,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.desde.is_some()
    }
}

/// Caller-supplied overrides for one run.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    /// Explicit lower bound; forces manual mode.
    pub desde: Option<NaiveDate>,
    /// Explicit upper bound; defaults to today when a lower bound exists.
    pub hasta: Option<NaiveDate>,
    /// Ignore prior state and fetch the entire collection.
    pub force_full: bool,
    /// Override of the source's default lookback window.
    pub lookback_days: Option<u32>,
}

/// Outcome summary for one source run. Created at run end, consumed by
/// the runner for reporting; not persisted.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub source: String,
    pub mode: Option<SyncMode>,
    pub desde: Option<NaiveDateTime>,
    pub hasta: Option<NaiveDateTime>,
    /// Raw records fetched from the remote endpoint.
    pub fetched: u64,
    /// Rows written to the target store.
    pub written: u64,
    /// Malformed records dropped (missing key field).
    pub skipped: u64,
    pub duration: Duration,
    pub error: Option<String>,
}

impl SyncResult {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            mode: None,
            desde: None,
            hasta: None,
            fetched: 0,
            written: 0,
            skipped: 0,
            duration: Duration::ZERO,
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}
