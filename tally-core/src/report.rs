//! Plain-text rendering of summaries and listings for the terminal.

use std::collections::BTreeMap;

use crate::transaction::{DailyBalance, Transaction};

pub fn render_balance(balance: f64) -> String {
    format!("The balance is: ${:.2}", balance)
}

pub fn render_ledger_totals(totals: &BTreeMap<String, f64>) -> String {
    let width = column_width(totals.keys().map(String::len), "Ledger");
    let mut out = format!("{:<width$}  {:>12}\n", "Ledger", "Amount");
    for (ledger, amount) in totals {
        out.push_str(&format!("{:<width$}  {:>12.2}\n", ledger, amount));
    }
    out
}

pub fn render_running_balance(rows: &[DailyBalance]) -> String {
    let mut out = format!("{:<10}  {:>12}  {:>18}\n", "Date", "Amount", "Cumulative Balance");
    for row in rows {
        out.push_str(&format!(
            "{:<10}  {:>12.2}  {:>18.2}\n",
            row.date.to_string(),
            row.amount,
            row.cumulative
        ));
    }
    out
}

pub fn render_transactions(txns: &[Transaction]) -> String {
    let ledger_w = column_width(txns.iter().map(|t| t.ledger.len()), "Ledger");
    let mut out = format!(
        "{:<10}  {:>12}  {:<ledger_w$}  {}\n",
        "Date", "Amount", "Ledger", "Company"
    );
    for t in txns {
        out.push_str(&format!(
            "{:<10}  {:>12.2}  {:<ledger_w$}  {}\n",
            t.date.to_string(),
            t.amount,
            t.ledger,
            t.company
        ));
    }
    out
}

fn column_width(lens: impl Iterator<Item = usize>, header: &str) -> usize {
    lens.max().unwrap_or(0).max(header.len())
}
