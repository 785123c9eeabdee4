//! Interactive numbered menu over an already-loaded transaction set.

use anyhow::Result;
use std::io::{BufRead, Write};

use tally_core::report::{
    render_balance, render_ledger_totals, render_running_balance, render_transactions,
};
use tally_core::{balance, running_balance, totals_by_ledger, Transaction};

const MENU: &str = "
-------------------------
 What would you like to do?
 1 - Get balance
 2 - Get expense by category
 3 - Get a running balance
 4 - Print all transactions
 0 - Quit
-------------------------
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Balance,
    Ledgers,
    Running,
    List,
    Quit,
}

impl Choice {
    /// Empty, `0`, and anything unrecognised quit.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "1" => Choice::Balance,
            "2" => Choice::Ledgers,
            "3" => Choice::Running,
            "4" => Choice::List,
            _ => Choice::Quit,
        }
    }
}

/// Text for one view.
pub fn render(choice: Choice, txns: &[Transaction]) -> Option<String> {
    match choice {
        Choice::Balance => Some(render_balance(balance(txns))),
        Choice::Ledgers => Some(render_ledger_totals(&totals_by_ledger(txns))),
        Choice::Running => Some(render_running_balance(&running_balance(txns))),
        Choice::List => Some(render_transactions(txns)),
        Choice::Quit => None,
    }
}

/// Read one line per iteration until the user quits or input ends.
pub fn run_menu<R: BufRead, W: Write>(txns: &[Transaction], mut input: R, mut out: W) -> Result<()> {
    loop {
        write!(out, "{}", MENU)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match render(Choice::parse(&line), txns) {
            Some(text) => writeln!(out, "{}", text.trim_end())?,
            None => return Ok(()),
        }
    }
}
