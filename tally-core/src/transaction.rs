//! Transaction record types shared by the fetcher and the summary layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ledger assigned to records that arrive with an empty category.
pub const DEFAULT_LEDGER: &str = "Payments";

/// A normalized transaction: typed date and amount, non-empty ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Posting date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Positive = income, negative = expense
    pub amount: f64,
    /// Category label; never empty once post-processed
    pub ledger: String,
    /// Merchant description, raw until cleaned
    pub company: String,
}

impl Transaction {
    /// Create a new Transaction. An empty ledger becomes [`DEFAULT_LEDGER`].
    pub fn new(
        date: NaiveDate,
        amount: f64,
        ledger: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        let ledger = ledger.into();
        Self {
            date,
            amount,
            ledger: normalize_ledger(ledger),
            company: company.into(),
        }
    }

    /// Key under which two records count as exact duplicates.
    ///
    /// `-0.0` and `0.0` compare equal as amounts, so they share a key.
    pub fn dedup_key(&self) -> (NaiveDate, u64, &str, &str) {
        let amount = if self.amount == 0.0 { 0.0_f64 } else { self.amount };
        (self.date, amount.to_bits(), &self.ledger, &self.company)
    }
}

/// Replace an empty or blank ledger with [`DEFAULT_LEDGER`].
pub fn normalize_ledger(ledger: String) -> String {
    if ledger.trim().is_empty() {
        DEFAULT_LEDGER.to_string()
    } else {
        ledger
    }
}

/// One row of the running daily balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailyBalance {
    pub date: NaiveDate,
    /// Sum of all amounts posted on `date`
    pub amount: f64,
    /// Balance at end of `date`
    pub cumulative: f64,
}
