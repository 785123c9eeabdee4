//! Post-processing applied once to the merged pages of a fetch:
//! typed amounts and dates, default ledger, exact-duplicate removal,
//! stable date ordering.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use tally_core::Transaction;

use crate::error::FetchError;
use crate::types::RawTransaction;

/// Date layouts accepted from the feed, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

pub fn parse_amount(raw: &str) -> Result<f64, FetchError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FetchError::BadAmount {
            raw: raw.to_string(),
        }),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, FetchError> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| FetchError::BadDate {
            raw: raw.to_string(),
        })
}

/// Convert one wire record. The first bad field aborts the batch.
pub fn to_transaction(raw: RawTransaction) -> Result<Transaction, FetchError> {
    let amount = parse_amount(&raw.amount)?;
    let date = parse_date(&raw.date)?;
    Ok(Transaction::new(date, amount, raw.ledger, raw.company))
}

/// Remove exact duplicates, keeping the first occurrence.
pub fn dedup(txns: &mut Vec<Transaction>) {
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        txns.iter().map(|t| seen.insert(t.dedup_key())).collect()
    };
    let mut keep = keep.into_iter();
    txns.retain(|_| keep.next().unwrap_or(true));
}

/// Stable ascending sort by date.
pub fn sort_by_date(txns: &mut [Transaction]) {
    txns.sort_by_key(|t| t.date);
}

/// Full post-processing pass over merged pages.
pub fn post_process(raw: Vec<RawTransaction>) -> Result<Vec<Transaction>, FetchError> {
    let mut txns = raw
        .into_iter()
        .map(to_transaction)
        .collect::<Result<Vec<_>, _>>()?;
    dedup(&mut txns);
    sort_by_date(&mut txns);
    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, amount: &str, ledger: &str, company: &str) -> RawTransaction {
        RawTransaction {
            date: date.to_string(),
            amount: amount.to_string(),
            ledger: ledger.to_string(),
            company: company.to_string(),
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-110.71").unwrap(), -110.71);
        assert_eq!(parse_amount(" 20000 ").unwrap(), 20000.0);
        assert!(matches!(parse_amount("1,234.50"), Err(FetchError::BadAmount { .. })));
        assert!(matches!(parse_amount("abc"), Err(FetchError::BadAmount { raw }) if raw == "abc"));
        assert!(matches!(parse_amount(""), Err(FetchError::BadAmount { .. })));
        assert!(matches!(parse_amount("NaN"), Err(FetchError::BadAmount { .. })));
        assert!(matches!(parse_amount("inf"), Err(FetchError::BadAmount { .. })));
    }

    #[test]
    fn test_parse_date_formats() {
        let want = NaiveDate::from_ymd_opt(2013, 12, 22).unwrap();
        assert_eq!(parse_date("2013-12-22").unwrap(), want);
        assert_eq!(parse_date("2013/12/22").unwrap(), want);
        assert_eq!(parse_date("12/22/2013").unwrap(), want);
        assert_eq!(parse_date("2013-12-22T10:00:00Z").unwrap(), want);
        assert!(matches!(parse_date("22nd Dec"), Err(FetchError::BadDate { .. })));
        assert!(matches!(parse_date("2013-02-30"), Err(FetchError::BadDate { .. })));
    }

    #[test]
    fn test_empty_ledger_becomes_payments() {
        let t = to_transaction(raw("2013-12-22", "5", "", "Client")).unwrap();
        assert_eq!(t.ledger, "Payments");
    }

    #[test]
    fn test_dedup_keeps_first_and_is_idempotent() {
        let mut txns = post_process(vec![
            raw("2013-12-22", "-5", "Fees", "Bank"),
            raw("2013-12-21", "7", "Fees", "Bank"),
            raw("2013-12-22", "-5.00", "Fees", "Bank"),
            raw("2013-12-22", "-5", "Fees", "Other Bank"),
        ])
        .unwrap();
        assert_eq!(txns.len(), 3);

        let once = txns.clone();
        dedup(&mut txns);
        assert_eq!(txns, once);
    }

    #[test]
    fn test_sort_is_stable() {
        let txns = post_process(vec![
            raw("2013-12-22", "1", "A", "first"),
            raw("2013-12-20", "2", "A", "earliest"),
            raw("2013-12-22", "3", "A", "second"),
            raw("2013-12-22", "4", "A", "third"),
        ])
        .unwrap();

        let names: Vec<_> = txns.iter().map(|t| t.company.as_str()).collect();
        assert_eq!(names, vec!["earliest", "first", "second", "third"]);
        assert!(txns.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_bad_record_aborts_batch() {
        let err = post_process(vec![
            raw("2013-12-22", "1", "A", "ok"),
            raw("2013-12-22", "one", "A", "bad"),
        ])
        .unwrap_err();
        assert!(matches!(err, FetchError::BadAmount { raw } if raw == "one"));
    }
}
