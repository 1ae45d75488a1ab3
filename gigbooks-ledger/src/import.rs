//! Import expenses from a CSV statement export.
//!
//! Expected columns: Date,Description,Amount,Category. The header row is
//! located by its "Date" cell, so exports with preamble rows still parse.
//! Unparseable rows are skipped, not fatal.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

/// One row parsed from a statement CSV, not yet attached to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: String,
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

/// Parse a statement CSV into expense rows.
pub fn parse_expense_csv(path: impl AsRef<Path>) -> Result<Vec<ExpenseRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;

    let mut rows = Vec::new();
    let mut header_found = false;

    for result in rdr.records() {
        let record = result?;
        if !header_found {
            if record.get(0).map(|s| s.trim()) == Some("Date") {
                header_found = true;
            }
            continue;
        }

        let Some(date) = record.get(0).and_then(|s| parse_date(s.trim())) else {
            continue;
        };
        let amount: f64 = match record.get(2).map(|s| s.trim().parse()) {
            Some(Ok(a)) => a,
            _ => continue,
        };
        // Statement exports mark charges negative; the ledger stores
        // expenses as positive amounts.
        let amount = amount.abs();
        if amount == 0.0 {
            continue;
        }

        rows.push(ExpenseRow {
            date,
            description: record.get(1).unwrap_or("").trim().to_string(),
            amount,
            category: {
                let c = record.get(3).unwrap_or("").trim();
                if c.is_empty() { "Uncategorized".to_string() } else { c.to_string() }
            },
        });
    }

    Ok(rows)
}

/// Add parsed rows to the ledger for `user_id`, returning how many landed.
pub fn import_expenses(
    ledger: &mut crate::store::Ledger,
    user_id: &str,
    rows: &[ExpenseRow],
) -> usize {
    for r in rows {
        ledger.add_expense(user_id, r.amount, &r.description, &r.category, r.date);
    }
    rows.len()
}
