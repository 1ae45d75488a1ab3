//! gigbooks-core: domain types and deterministic assistant logic.
//!
//! Everything in this crate is pure: no I/O, no clock reads (callers pass
//! "today" in), no network. The ledger crate computes aggregates over
//! stored records; this crate classifies prompts, derives invoice aging,
//! forecasts income, and renders replies.

pub mod aggregates;
pub mod duedate;
pub mod forecast;
pub mod intent;
pub mod money;
pub mod reply;
pub mod types;

pub use aggregates::{ExpenseStats, IncomeMonth, InvoiceStats, SalesStats, UnpaidContext, YearToDate};
pub use duedate::{InvoiceAging, age_invoice, today_in_tz, AT_RISK_WINDOW_DAYS, DUE_SOON_WINDOW_DAYS};
pub use forecast::{Confidence, IncomeForecast, MonthlyIncome, Trend, predict};
pub use intent::{Intent, MonthRef, StatusFilter, classify, month_name};
pub use money::{format_usd, parse_usd, round_cents};
pub use types::{ConversationTurn, Expense, Invoice, InvoiceStatus, LineItem, UserProfile};
