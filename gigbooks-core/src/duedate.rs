//! Due-date arithmetic: aging an invoice against "today".
//!
//! All windows are whole days in the user's local calendar. "Today" comes
//! from the caller so aggregates stay deterministic and testable; the CLI
//! resolves it from the profile's IANA timezone.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::Invoice;

/// A pending invoice due within this many days counts as due-soon.
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;
/// A pending invoice with this many days or fewer left counts as at-risk.
pub const AT_RISK_WINDOW_DAYS: i64 = 3;

/// Derived aging for one unpaid invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceAging {
    pub invoice_id: String,
    pub client_name: String,
    pub total: f64,
    pub due_date: NaiveDate,
    /// Whole days past due; 0 when not yet due.
    pub days_overdue: i64,
    /// Whole days until due; 0 when due today or already past.
    pub days_till_due: i64,
    pub is_overdue: bool,
    pub is_pending: bool,
}

impl InvoiceAging {
    pub fn is_due_today(&self) -> bool {
        self.days_overdue == 0 && self.days_till_due == 0
    }

    pub fn is_due_soon(&self) -> bool {
        !self.is_overdue && self.days_till_due > 0 && self.days_till_due <= DUE_SOON_WINDOW_DAYS
    }

    pub fn is_at_risk(&self) -> bool {
        self.is_overdue || self.days_till_due <= AT_RISK_WINDOW_DAYS
    }
}

/// Age an unpaid invoice against `today`. Callers filter out paid
/// invoices first; aging a paid invoice has no meaning.
pub fn age_invoice(inv: &Invoice, today: NaiveDate) -> InvoiceAging {
    let diff = (today - inv.due_date).num_days();
    let (days_overdue, days_till_due) = if diff > 0 { (diff, 0) } else { (0, -diff) };

    InvoiceAging {
        invoice_id: inv.id.clone(),
        client_name: if inv.client_name.trim().is_empty() {
            "Unknown Client".to_string()
        } else {
            inv.client_name.clone()
        },
        total: inv.total(),
        due_date: inv.due_date,
        days_overdue,
        days_till_due,
        is_overdue: days_overdue > 0,
        is_pending: inv.is_pending() && days_overdue == 0,
    }
}

/// Resolve "today" in an IANA timezone like "America/Chicago".
pub fn today_in_tz(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}
