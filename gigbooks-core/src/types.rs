//! Entity types for the freelancer ledger.
//!
//! Invoices store only what the user entered. Totals are always derived
//! from line items plus tax, and "overdue" is never a stored state: it is
//! computed from a pending status and a past due date at query time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One billable item on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub price: f64,
}

/// Stored invoice status. Overdue is derived, not stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "paid")]
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub user_id: String,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: String,
    pub client_address: String,
    pub items: Vec<LineItem>,
    /// Optional flat tax amount; zero for most freelance invoices.
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub note: String,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub created_at: NaiveDate,
}

impl Invoice {
    /// Billable total: sum of line items plus tax. The single source of
    /// truth for every aggregate in the system.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.price).sum::<f64>() + self.tax
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvoiceStatus::Pending
    }
}

/// An expense line. Purely additive; no status lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

/// One prompt/response pair in the assistant conversation. Append-only;
/// `created_at` ordering defines replay order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub response: String,
    pub created_at: String,
}

/// Registered user. The router reads this only to personalize fallback
/// prompts and answer profile questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub business: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice_with_items(items: Vec<LineItem>, tax: f64) -> Invoice {
        Invoice {
            id: "inv-1".to_string(),
            user_id: "u1".to_string(),
            invoice_number: "INV-001".to_string(),
            client_name: "Acme".to_string(),
            client_email: "billing@acme.test".to_string(),
            client_address: "1 Main St".to_string(),
            items,
            tax,
            note: String::new(),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            status: InvoiceStatus::Pending,
            created_at: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[test]
    fn total_is_items_plus_tax() {
        let inv = invoice_with_items(
            vec![
                LineItem { name: "Design".to_string(), price: 400.0 },
                LineItem { name: "Hosting".to_string(), price: 25.5 },
            ],
            10.0,
        );
        assert_eq!(inv.total(), 435.5);
    }

    #[test]
    fn total_of_empty_invoice_is_tax_only() {
        let inv = invoice_with_items(vec![], 0.0);
        assert_eq!(inv.total(), 0.0);
    }

    #[test]
    fn status_serializes_lowercase() {
        let s = serde_json::to_string(&InvoiceStatus::Paid).unwrap();
        assert_eq!(s, "\"paid\"");
        let back: InvoiceStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(back, InvoiceStatus::Pending);
    }
}
