//! Reductions over a cleaned, date-sorted transaction set.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::transaction::{DailyBalance, Transaction};

/// Sum of every amount.
pub fn balance(txns: &[Transaction]) -> f64 {
    txns.iter().map(|t| t.amount).sum()
}

/// Amount total per ledger, ledgers in sorted order.
pub fn totals_by_ledger(txns: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for t in txns {
        *totals.entry(t.ledger.clone()).or_insert(0.0) += t.amount;
    }
    totals
}

/// Per-day totals with the cumulative balance at the end of each day.
///
/// Days are emitted in ascending order regardless of input order.
pub fn running_balance(txns: &[Transaction]) -> Vec<DailyBalance> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in txns {
        *per_day.entry(t.date).or_insert(0.0) += t.amount;
    }

    let mut cumulative = 0.0;
    per_day
        .into_iter()
        .map(|(date, amount)| {
            cumulative += amount;
            DailyBalance {
                date,
                amount,
                cumulative,
            }
        })
        .collect()
}
