//! tally-core: transaction types, merchant-name cleaning, and summaries

pub mod clean;
pub mod report;
pub mod summary;
pub mod transaction;

pub use clean::clean;
pub use summary::{balance, running_balance, totals_by_ledger};
pub use transaction::{DailyBalance, Transaction, DEFAULT_LEDGER};
