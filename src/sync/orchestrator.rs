//! Per-source sync pipeline: resolve the window, stream pages, and land
//! batched upserts. One page is in memory at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::retry::{with_retry, RetryPolicy};
use super::strategy;
use crate::models::{RawRecord, SyncRequest, SyncResult};
use crate::remote::{ApexClient, FetchError, PageReader};
use crate::repository::{SqlitePool, WriteError};
use crate::sources::{SyncSource, TargetRow};
use crate::transform::dedupe_by_id;

/// Shared run configuration handed to every source.
#[derive(Clone)]
pub struct SyncContext {
    pub client: Arc<ApexClient>,
    pub pool: SqlitePool,
    /// Rows per upsert statement.
    pub batch_size: usize,
    /// Pause between consecutive upsert batches.
    pub rate_limit: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Run one source end to end. Failures are captured in the result, not
/// propagated; the caller decides whether a failed source stops the run.
pub async fn sync_source<S: SyncSource>(
    ctx: &SyncContext,
    source: &S,
    request: &SyncRequest,
) -> SyncResult {
    let started = Instant::now();
    let name = source.descriptor().name;
    let mut result = SyncResult::new(name);

    if let Err(err) = run(ctx, source, request, &mut result).await {
        error!(source = name, error = %err, "sync failed");
        result.error = Some(err.to_string());
    }

    result.duration = started.elapsed();
    if result.success() {
        info!(
            source = name,
            mode = %result.mode.map(|m| m.as_str()).unwrap_or("?"),
            fetched = result.fetched,
            written = result.written,
            skipped = result.skipped,
            elapsed_ms = result.duration.as_millis() as u64,
            "sync complete"
        );
    }
    result
}

async fn run<S: SyncSource>(
    ctx: &SyncContext,
    source: &S,
    request: &SyncRequest,
    result: &mut SyncResult,
) -> Result<(), SyncError> {
    let desc = source.descriptor();
    // Only time-filtered sources carry state worth reading; a failed
    // state query means no usable prior state, not a dead run.
    let last_modified = if desc.supports_time_filter() {
        match source.max_modified(&ctx.pool).await {
            Ok(mark) => mark,
            Err(err) => {
                warn!(source = desc.name, error = %err, "state query failed, treating as first run");
                None
            }
        }
    } else {
        None
    };
    let today = Local::now().date_naive();
    let window = strategy::resolve(desc, last_modified, request, today);

    result.mode = Some(window.mode);
    result.desde = window.desde;
    result.hasta = window.hasta;

    info!(
        source = desc.name,
        mode = %window.mode,
        desde = %window.desde.map(|d| d.to_string()).unwrap_or_default(),
        hasta = %window.hasta.map(|d| d.to_string()).unwrap_or_default(),
        "starting sync"
    );

    let mut reader = source.reader(Arc::clone(&ctx.client), &window);
    let mut first_batch = true;

    while let Some(records) = fetch_with_retry(reader.as_mut(), &ctx.retry).await? {
        result.fetched += records.len() as u64;

        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            match source.transform(record) {
                Ok(row) => rows.push(row),
                Err(err) => {
                    result.skipped += 1;
                    debug!(source = desc.name, error = %err, "skipping malformed record");
                }
            }
        }

        // A page can carry the same id more than once; the last
        // occurrence wins, matching the remote's own ordering.
        let rows = dedupe_by_id(rows, |row| row.id());

        for chunk in rows.chunks(ctx.batch_size) {
            if !first_batch {
                tokio::time::sleep(ctx.rate_limit).await;
            }
            first_batch = false;

            let batch = chunk.to_vec();
            let written = with_retry(&ctx.retry, "upsert batch", |_: &WriteError| true, || {
                source.write_batch(&ctx.pool, batch.clone())
            })
            .await?;
            result.written += written as u64;
        }
    }

    Ok(())
}

/// Fetch the next page, retrying transient failures in place. The
/// reader keeps its offset across attempts, so a retry re-requests the
/// same page.
async fn fetch_with_retry(
    reader: &mut dyn PageReader,
    policy: &RetryPolicy,
) -> Result<Option<Vec<RawRecord>>, FetchError> {
    let mut attempt = 1;
    loop {
        match reader.next_page().await {
            Ok(page) => return Ok(page),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "page fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
