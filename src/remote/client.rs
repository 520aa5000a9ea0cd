//! HTTP client for Oracle APEX REST Data Services endpoints.
//!
//! Endpoints return JSON as either a bare array or an ORDS object with
//! an `items` list and a `hasMore` flag. Pagination is offset/limit.
//! Time-filtered variants take a `/{YYYYMMDD}/{YYYYMMDD}` period path.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{RawRecord, SourceDescriptor, SyncWindow};

const USER_AGENT: &str = concat!("savio-sync/", env!("CARGO_PKG_VERSION"));

/// Fetch failure, split by whether retrying can help.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, connection failure, or a 5xx/429/408 response.
    #[error("transient fetch error: {0}")]
    Transient(String),
    /// Auth failure, other 4xx, or a malformed response body.
    #[error("fatal fetch error: {0}")]
    Fatal(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_decode() {
            FetchError::Fatal(err.to_string())
        } else {
            // Timeouts, connect errors and mid-body failures are all
            // worth another attempt.
            FetchError::Transient(err.to_string())
        }
    }
}

/// One page of raw records.
#[derive(Debug)]
pub struct Page {
    pub records: Vec<RawRecord>,
    pub has_more: bool,
}

impl Page {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            has_more: false,
        }
    }
}

/// Read-only client for the remote catalog.
#[derive(Clone)]
pub struct ApexClient {
    http: Client,
    base_url: String,
}

impl ApexClient {
    /// Create a new client. Panics on an invalid base URL or TLS setup
    /// failure; both are unrecoverable configuration errors.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let parsed = Url::parse(base_url).expect("invalid base URL");
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Collection URL for a source under the resolved window. Bounded
    /// windows use the period endpoint when the source has one; the
    /// period path takes whole days, so bounds are floored to dates.
    pub fn collection_url(&self, desc: &SourceDescriptor, window: &SyncWindow) -> String {
        match (desc.period_endpoint, window.desde, window.hasta) {
            (Some(period), Some(desde), Some(hasta)) => format!(
                "{}/{}/{}/{}",
                self.base_url,
                period,
                desde.format("%Y%m%d"),
                hasta.format("%Y%m%d"),
            ),
            _ => self.endpoint_url(desc.endpoint),
        }
    }

    /// Fetch one page. A 404 is an empty terminal page, not an error
    /// (the remote returns it for windows with no data).
    pub async fn fetch_page(&self, url: &str, offset: u64, limit: u32) -> Result<Page, FetchError> {
        debug!(url, offset, limit, "fetching page");

        let response = self
            .http
            .get(url)
            .query(&[("offset", offset.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Page::empty());
        }
        if status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
            || status.is_server_error()
        {
            return Err(FetchError::Transient(format!("HTTP {status} from {url}")));
        }
        if !status.is_success() {
            return Err(FetchError::Fatal(format!("HTTP {status} from {url}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Fatal(format!("invalid JSON from {url}: {e}")))?;

        Ok(parse_page(body, limit))
    }
}

/// Extract records and the continuation flag from a response body.
pub fn parse_page(body: Value, limit: u32) -> Page {
    match body {
        Value::Array(items) => {
            let records = collect_records(items);
            // Bare arrays carry no hasMore flag; a full page means there
            // may be another one.
            let has_more = limit > 0 && records.len() as u32 == limit;
            Page { records, has_more }
        }
        Value::Object(map) => {
            let has_more = map.get("hasMore").and_then(Value::as_bool).unwrap_or(false);
            for key in ["items", "rows", "data"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    return Page {
                        records: collect_records(items.clone()),
                        has_more,
                    };
                }
            }
            if map.is_empty() {
                Page::empty()
            } else {
                // A bare object is a single-record response.
                Page {
                    records: vec![map],
                    has_more: false,
                }
            }
        }
        _ => Page::empty(),
    }
}

fn collect_records(items: Vec<Value>) -> Vec<RawRecord> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SyncMode;
    use chrono::NaiveDate;
    use serde_json::json;

    fn test_descriptor(period: Option<&'static str>) -> SourceDescriptor {
        SourceDescriptor {
            name: "test",
            endpoint: "test_endpoint",
            period_endpoint: period,
            table: "test",
            key_fields: &["id"],
            page_size: 1000,
            lookback_days: 30,
        }
    }

    fn window(mode: SyncMode, desde: Option<&str>, hasta: Option<&str>) -> SyncWindow {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        SyncWindow {
            mode,
            desde: desde.map(parse),
            hasta: hasta.map(parse),
        }
    }

    #[test]
    fn parses_ords_object_with_has_more() {
        let body = json!({"items": [{"a": 1}, {"a": 2}], "hasMore": true});
        let page = parse_page(body, 1000);
        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);
    }

    #[test]
    fn parses_bare_array_inferring_continuation() {
        let body = json!([{"a": 1}, {"a": 2}]);
        let page = parse_page(body, 2);
        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);

        let body = json!([{"a": 1}]);
        let page = parse_page(body, 2);
        assert!(!page.has_more);
    }

    #[test]
    fn parses_single_object_as_one_record() {
        let page = parse_page(json!({"a": 1}), 1000);
        assert_eq!(page.records.len(), 1);
        assert!(!page.has_more);
    }

    #[test]
    fn period_url_uses_day_segments() {
        let client = ApexClient::new("https://erp.example.com/apex/savio", Duration::from_secs(5));
        let desc = test_descriptor(Some("periodo/log_vidrios"));
        let w = window(
            SyncMode::Incremental,
            Some("2026-01-20"),
            Some("2026-01-23"),
        );
        assert_eq!(
            client.collection_url(&desc, &w),
            "https://erp.example.com/apex/savio/periodo/log_vidrios/20260120/20260123"
        );
    }

    #[test]
    fn unfiltered_source_ignores_window() {
        let client = ApexClient::new("https://erp.example.com/apex/savio", Duration::from_secs(5));
        let desc = test_descriptor(None);
        let w = window(SyncMode::Full, Some("2026-01-20"), Some("2026-01-23"));
        assert_eq!(
            client.collection_url(&desc, &w),
            "https://erp.example.com/apex/savio/test_endpoint"
        );
    }
}
