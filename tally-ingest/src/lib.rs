//! tally-ingest: paginated transaction fetching, merge, and post-processing.

pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod source;
pub mod types;

pub use error::{FetchError, PageError};
pub use fetcher::{clean_companies, fetch_all, load_transactions, FetchMode, FetchOptions};
pub use source::{HttpPageSource, PageSource, DEFAULT_BASE_URL};
pub use types::{Page, RawTransaction};
