//! Paginated fetch-and-merge.
//!
//! Page 1 reports `totalCount`; further pages are requested until that many
//! records have been collected. Pages can be fetched one at a time or, once
//! the first page size is known, several at once. Either way the merged
//! order is page order, so both modes produce the same result.
//!
//! Any failure aborts the whole fetch. A short fetch is never returned as
//! if it were complete.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tally_core::{clean, Transaction};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{FetchError, PageError};
use crate::normalize::{dedup, post_process};
use crate::source::PageSource;
use crate::types::{Page, RawTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// One request at a time, in page order.
    Sequential,
    /// At most `concurrency` requests in flight, merged in page order.
    Concurrent { concurrency: usize },
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub mode: FetchMode,
    /// Deadline for each page request.
    pub page_timeout: Duration,
    /// Highest page number that will ever be requested.
    pub max_pages: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            mode: FetchMode::Concurrent { concurrency: 4 },
            page_timeout: Duration::from_secs(10),
            max_pages: 10_000,
        }
    }
}

/// Fetch every page, merge, and post-process (typed fields, default
/// ledger, dedup, date sort). Company names are left raw.
pub async fn fetch_all<S: PageSource>(
    source: &S,
    options: &FetchOptions,
    cancel: &CancellationToken,
) -> Result<Vec<Transaction>, FetchError> {
    let mut session = Session::new(source, options, cancel);
    session.run().await?;

    let Session {
        raw,
        total,
        pages_fetched,
        ..
    } = session;
    let fetched = raw.len();
    let txns = post_process(raw)?;
    info!(
        total,
        fetched,
        unique = txns.len(),
        pages = pages_fetched,
        "fetch complete"
    );
    Ok(txns)
}

/// [`fetch_all`] followed by company-name cleaning of every record.
///
/// Duplicates are removed again once names are clean, so records that
/// differ only in masked card digits or store numbers collapse to one.
pub async fn load_transactions<S: PageSource>(
    source: &S,
    options: &FetchOptions,
    cancel: &CancellationToken,
) -> Result<Vec<Transaction>, FetchError> {
    let mut txns = fetch_all(source, options, cancel).await?;
    clean_companies(&mut txns);
    let fetched = txns.len();
    dedup(&mut txns);
    debug!(fetched, unique = txns.len(), "deduplicated cleaned names");
    Ok(txns)
}

/// Replace every raw company name with its cleaned form.
pub fn clean_companies(txns: &mut [Transaction]) {
    for t in txns {
        t.company = clean(&t.company);
    }
}

/// Pages planned from the first page: `ceil(total / first_page_len)`.
pub fn planned_pages(total: usize, first_page_len: usize) -> u32 {
    if first_page_len == 0 {
        return 1;
    }
    let pages = total.div_ceil(first_page_len).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// State owned by one fetch; handed to the caller only once complete.
struct Session<'a, S> {
    source: &'a S,
    options: &'a FetchOptions,
    cancel: &'a CancellationToken,
    raw: Vec<RawTransaction>,
    total: usize,
    pages_fetched: usize,
}

impl<'a, S: PageSource> Session<'a, S> {
    fn new(source: &'a S, options: &'a FetchOptions, cancel: &'a CancellationToken) -> Self {
        Self {
            source,
            options,
            cancel,
            raw: Vec::new(),
            total: 0,
            pages_fetched: 0,
        }
    }

    async fn run(&mut self) -> Result<(), FetchError> {
        let first = match request(self.source, 1, self.options.page_timeout, self.cancel).await {
            Some(Ok(page)) => page,
            Some(Err(source)) => {
                warn!(error = %source, "first page failed");
                return Err(FetchError::Unreachable { source });
            }
            None => return Err(FetchError::Cancelled),
        };

        self.total = first.total_count;
        let first_len = first.transactions.len();
        debug!(total = self.total, first_len, "first page");
        self.accept(1, first)?;

        let next = match self.options.mode {
            FetchMode::Sequential => 2,
            FetchMode::Concurrent { concurrency } if self.is_short() => {
                let last = planned_pages(self.total, first_len).min(self.options.max_pages);
                self.fetch_planned(2, last, concurrency.max(1)).await?;
                last.saturating_add(1).max(2)
            }
            FetchMode::Concurrent { .. } => 2,
        };

        self.fetch_remaining(next).await
    }

    /// Pages `first..=last` with bounded concurrency, accepted in page order.
    async fn fetch_planned(&mut self, first: u32, last: u32, concurrency: usize) -> Result<(), FetchError> {
        if first > last {
            return Ok(());
        }
        debug!(first, last, concurrency, "fetching planned pages");

        let (source, timeout, cancel) = (self.source, self.options.page_timeout, self.cancel);
        let mut pages = stream::iter(first..=last)
            .map(move |page| async move { (page, request(source, page, timeout, cancel).await) })
            .buffered(concurrency);

        while let Some((page, result)) = pages.next().await {
            let body = self.settle(page, result)?;
            self.accept(page, body)?;
            if !self.is_short() {
                // Later pages were planned from the first page's size; drop them.
                break;
            }
        }
        Ok(())
    }

    /// One page at a time from `page` until `totalCount` is reached.
    async fn fetch_remaining(&mut self, mut page: u32) -> Result<(), FetchError> {
        while self.is_short() {
            if page > self.options.max_pages {
                warn!(page, max_pages = self.options.max_pages, "page ceiling reached");
                return Err(self.stalled(page));
            }
            let result = request(self.source, page, self.options.page_timeout, self.cancel).await;
            let body = self.settle(page, result)?;
            self.accept(page, body)?;
            page += 1;
        }
        Ok(())
    }

    fn settle(&self, page: u32, result: Option<Result<Page, PageError>>) -> Result<Page, FetchError> {
        match result {
            Some(Ok(body)) => Ok(body),
            Some(Err(source)) => {
                warn!(page, error = %source, "page failed");
                Err(FetchError::PartialFailure {
                    page,
                    pages_fetched: self.pages_fetched,
                    source,
                })
            }
            None => Err(FetchError::Cancelled),
        }
    }

    fn accept(&mut self, page: u32, body: Page) -> Result<(), FetchError> {
        if body.total_count != self.total {
            warn!(page, expected = self.total, got = body.total_count, "totalCount changed mid-fetch");
        }
        if body.transactions.is_empty() && self.is_short() {
            warn!(page, fetched = self.raw.len(), total = self.total, "empty page before totalCount");
            return Err(self.stalled(page));
        }
        debug!(page, len = body.transactions.len(), "page merged");
        self.raw.extend(body.transactions);
        self.pages_fetched += 1;
        Ok(())
    }

    fn is_short(&self) -> bool {
        self.raw.len() < self.total
    }

    fn stalled(&self, page: u32) -> FetchError {
        FetchError::Stalled {
            page,
            fetched: self.raw.len(),
            total: self.total,
        }
    }
}

/// One page request bounded by `timeout`. `None` means the fetch was cancelled.
async fn request<S: PageSource>(
    source: &S,
    page: u32,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<Result<Page, PageError>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = tokio::time::timeout(timeout, source.fetch_page(page)) => {
            Some(result.unwrap_or(Err(PageError::Timeout(timeout))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_pages() {
        assert_eq!(planned_pages(38, 10), 4);
        assert_eq!(planned_pages(40, 10), 4);
        assert_eq!(planned_pages(3, 10), 1);
        assert_eq!(planned_pages(0, 0), 1);
        assert_eq!(planned_pages(5, 0), 1);
    }

    #[test]
    fn test_default_options_are_bounded() {
        let opts = FetchOptions::default();
        assert!(opts.max_pages > 0);
        assert!(matches!(opts.mode, FetchMode::Concurrent { concurrency } if concurrency > 0));
    }
}
