//! Where pages come from.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::PageError;
use crate::types::Page;

pub const DEFAULT_BASE_URL: &str = "http://resttest.bench.co/transactions";

/// A paginated transaction feed. Pages are numbered from 1.
pub trait PageSource: Sync {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Page, PageError>> + Send;
}

/// Serves `GET {base}/{page}.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), page)
    }
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<Page, PageError> {
        let url = self.page_url(page);
        debug!(%url, "GET page");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PageError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
