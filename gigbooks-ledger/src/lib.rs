//! gigbooks-ledger: JSON-file store, read-side aggregators, and the
//! deterministic prompt-answer pipeline over them.

pub mod answer;
pub mod import;
pub mod stats;
pub mod store;

pub use answer::answer_prompt;
pub use import::{ExpenseRow, import_expenses, parse_expense_csv};
pub use store::Ledger;
