//! Aggregate result shapes shared by the ledger (which computes them)
//! and the reply formatter (which renders them).

use serde::{Deserialize, Serialize};

use crate::duedate::InvoiceAging;

/// Invoice counts by derived status, overall or for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InvoiceStats {
    pub total: usize,
    pub paid: usize,
    pub pending: usize,
    /// Derived: pending invoices whose due date has passed.
    pub overdue: usize,
}

/// Detailed context for every unpaid invoice, aged against today.
/// `details` is sorted most-overdue first, then soonest-due.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UnpaidContext {
    pub total_unpaid: usize,
    pub overdue_count: usize,
    pub pending_count: usize,
    pub details: Vec<InvoiceAging>,
}

impl UnpaidContext {
    pub fn overdue(&self) -> impl Iterator<Item = &InvoiceAging> {
        self.details.iter().filter(|d| d.is_overdue)
    }

    pub fn due_soon(&self) -> Vec<&InvoiceAging> {
        let mut v: Vec<&InvoiceAging> = self.details.iter().filter(|d| d.is_due_soon()).collect();
        v.sort_by_key(|d| d.days_till_due);
        v
    }

    pub fn due_today(&self) -> Vec<&InvoiceAging> {
        self.details.iter().filter(|d| d.is_due_today()).collect()
    }

    pub fn at_risk(&self) -> Vec<&InvoiceAging> {
        self.details.iter().filter(|d| d.is_at_risk()).collect()
    }

    pub fn outstanding_total(&self) -> f64 {
        self.details.iter().map(|d| d.total).sum()
    }
}

/// Expense totals with a per-category breakdown, largest category first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExpenseStats {
    pub count: usize,
    pub total_amount: f64,
    pub by_category: Vec<(String, f64)>,
}

/// Paid-invoice sales for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesStats {
    pub count: usize,
    pub total_sales: f64,
    pub highest_sale: f64,
    pub month: u32,
    pub year: i32,
}

/// Income detail for one month (sales plus an average).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeMonth {
    pub count: usize,
    pub total_income: f64,
    pub highest_sale: f64,
    pub average_sale: f64,
    pub month: u32,
    pub year: i32,
}

/// Paid income summed across the current calendar year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearToDate {
    pub total_income: f64,
    pub count: usize,
    pub year: i32,
}
