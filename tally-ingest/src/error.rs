use std::time::Duration;

use thiserror::Error;

/// Why a single page could not be obtained.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed page body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure of a whole fetch session. A fetch never returns partial data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transaction source unreachable")]
    Unreachable {
        #[source]
        source: PageError,
    },
    #[error("page {page} failed after {pages_fetched} page(s) were fetched")]
    PartialFailure {
        page: u32,
        pages_fetched: usize,
        #[source]
        source: PageError,
    },
    #[error("fetch stalled at page {page} with {fetched} of {total} transactions")]
    Stalled {
        page: u32,
        fetched: usize,
        total: usize,
    },
    #[error("unparseable amount {raw:?}")]
    BadAmount { raw: String },
    #[error("unparseable date {raw:?}")]
    BadDate { raw: String },
    #[error("fetch cancelled")]
    Cancelled,
}
