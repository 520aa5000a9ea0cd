//! Paged iteration over a remote collection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::client::{ApexClient, FetchError};
use crate::models::RawRecord;

/// Cap on pages per extraction; guards against a remote that never
/// clears `hasMore` (10M records at the default page size).
const MAX_PAGES: u64 = 10_000;

/// A stream of record pages. Restartable only from the beginning; no
/// cursor survives a process restart.
#[async_trait]
pub trait PageReader: Send {
    /// Next page of records, or `None` when the collection is
    /// exhausted. Transient errors may be retried by the caller; the
    /// reader keeps its position.
    async fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>, FetchError>;
}

/// Offset/limit paging over one collection URL.
pub struct OffsetPager {
    client: Arc<ApexClient>,
    url: String,
    page_size: u32,
    offset: u64,
    pages: u64,
    done: bool,
}

impl OffsetPager {
    pub fn new(client: Arc<ApexClient>, url: String, page_size: u32) -> Self {
        Self {
            client,
            url,
            page_size,
            offset: 0,
            pages: 0,
            done: false,
        }
    }
}

#[async_trait]
impl PageReader for OffsetPager {
    async fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>, FetchError> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .client
            .fetch_page(&self.url, self.offset, self.page_size)
            .await?;

        self.pages += 1;
        self.offset += u64::from(self.page_size);

        if page.records.is_empty() {
            self.done = true;
            return Ok(None);
        }

        if !page.has_more {
            self.done = true;
        } else if self.pages >= MAX_PAGES {
            warn!(url = %self.url, pages = self.pages, "page safety cap reached, stopping pagination");
            self.done = true;
        }

        debug!(
            url = %self.url,
            page = self.pages,
            records = page.records.len(),
            has_more = page.has_more,
            "fetched page"
        );

        Ok(Some(page.records))
    }
}
