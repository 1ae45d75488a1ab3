//! JSON-file ledger: the document store behind every aggregate.
//!
//! One file holds users, invoices, expenses, and conversation turns.
//! Every read is filtered by an explicit `user_id`; there is no ambient
//! "current user" in this crate. Writes go through `save()`, which the
//! CLI calls after each mutation.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gigbooks_core::types::{
    ConversationTurn, Expense, Invoice, InvoiceStatus, LineItem, UserProfile,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct BooksFile {
    seq: u64,
    users: Vec<UserProfile>,
    invoices: Vec<Invoice>,
    expenses: Vec<Expense>,
    conversations: Vec<ConversationTurn>,
}

#[derive(Debug)]
pub struct Ledger {
    path: Option<PathBuf>,
    data: BooksFile,
}

impl Ledger {
    /// A ledger with no backing file. Used by tests and dry runs;
    /// `save()` is a no-op.
    pub fn in_memory() -> Self {
        Self { path: None, data: BooksFile::default() }
    }

    /// Open (or initialize) the ledger file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let s = fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s)
                .with_context(|| format!("parse {}", path.display()))?
        } else {
            BooksFile::default()
        };
        Ok(Self { path: Some(path), data })
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.data.seq += 1;
        format!("{}-{}", prefix, self.data.seq)
    }

    // --- users ---

    /// Register a new user. Duplicate emails are rejected.
    pub fn register_user(&mut self, mut user: UserProfile) -> Result<UserProfile> {
        if self
            .data
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            bail!("email already exists: {}", user.email);
        }
        user.id = self.next_id("user");
        self.data.users.push(user.clone());
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Option<&UserProfile> {
        self.data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
    }

    pub fn user(&self, user_id: &str) -> Option<&UserProfile> {
        self.data.users.iter().find(|u| u.id == user_id)
    }

    pub fn update_profile(&mut self, updated: UserProfile) -> Result<()> {
        let slot = self
            .data
            .users
            .iter_mut()
            .find(|u| u.id == updated.id)
            .with_context(|| format!("no such user: {}", updated.id))?;
        *slot = updated;
        Ok(())
    }

    // --- invoices ---

    #[allow(clippy::too_many_arguments)]
    pub fn add_invoice(
        &mut self,
        user_id: &str,
        invoice_number: &str,
        client_name: &str,
        client_email: &str,
        client_address: &str,
        items: Vec<LineItem>,
        tax: f64,
        note: &str,
        due_date: NaiveDate,
        created_at: NaiveDate,
    ) -> Result<Invoice> {
        if items.is_empty() {
            bail!("an invoice needs at least one line item");
        }
        let inv = Invoice {
            id: self.next_id("inv"),
            user_id: user_id.to_string(),
            invoice_number: invoice_number.to_string(),
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
            client_address: client_address.to_string(),
            items,
            tax,
            note: note.to_string(),
            due_date,
            status: InvoiceStatus::Pending,
            created_at,
        };
        self.data.invoices.push(inv.clone());
        Ok(inv)
    }

    pub fn invoices_for(&self, user_id: &str) -> Vec<&Invoice> {
        self.data
            .invoices
            .iter()
            .filter(|i| i.user_id == user_id)
            .collect()
    }

    /// The only stored status transition: pending -> paid.
    pub fn mark_invoice_paid(&mut self, user_id: &str, invoice_id: &str) -> Result<()> {
        let inv = self
            .data
            .invoices
            .iter_mut()
            .find(|i| i.user_id == user_id && i.id == invoice_id)
            .with_context(|| format!("no such invoice: {invoice_id}"))?;
        if inv.status == InvoiceStatus::Paid {
            bail!("invoice {invoice_id} is already paid");
        }
        inv.status = InvoiceStatus::Paid;
        Ok(())
    }

    // --- expenses ---

    pub fn add_expense(
        &mut self,
        user_id: &str,
        amount: f64,
        description: &str,
        category: &str,
        date: NaiveDate,
    ) -> Expense {
        let exp = Expense {
            id: self.next_id("exp"),
            user_id: user_id.to_string(),
            amount,
            description: description.to_string(),
            category: if category.trim().is_empty() {
                "Uncategorized".to_string()
            } else {
                category.to_string()
            },
            date,
        };
        self.data.expenses.push(exp.clone());
        exp
    }

    pub fn expenses_for(&self, user_id: &str) -> Vec<&Expense> {
        self.data
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .collect()
    }

    // --- conversations ---

    pub fn add_conversation(
        &mut self,
        user_id: &str,
        prompt: &str,
        response: &str,
        created_at: &str,
    ) -> ConversationTurn {
        let turn = ConversationTurn {
            id: self.next_id("chat"),
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            created_at: created_at.to_string(),
        };
        self.data.conversations.push(turn.clone());
        turn
    }

    /// Conversation history for a user, oldest first.
    pub fn conversations_for(&self, user_id: &str) -> Vec<&ConversationTurn> {
        let mut turns: Vec<&ConversationTurn> = self
            .data
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .collect();
        turns.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            id: String::new(),
            fullname: "Jess Doe".to_string(),
            email: email.to_string(),
            business: "Doe Design".to_string(),
            contact_phone: "555-0100".to_string(),
            contact_address: "2 High St".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let mut ledger = Ledger::in_memory();
        ledger.register_user(profile("jess@doe.test")).unwrap();
        let err = ledger.register_user(profile("JESS@doe.test")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn login_checks_both_fields() {
        let mut ledger = Ledger::in_memory();
        let u = ledger.register_user(profile("jess@doe.test")).unwrap();
        assert_eq!(ledger.login("jess@doe.test", "hunter2").unwrap().id, u.id);
        assert!(ledger.login("jess@doe.test", "wrong").is_none());
    }

    #[test]
    fn update_profile_replaces_stored_fields() {
        let mut ledger = Ledger::in_memory();
        let u = ledger.register_user(profile("jess@doe.test")).unwrap();

        let mut edited = u.clone();
        edited.business = "Doe Studio".to_string();
        edited.contact_phone = "555-0199".to_string();
        ledger.update_profile(edited).unwrap();

        let stored = ledger.user(&u.id).unwrap();
        assert_eq!(stored.business, "Doe Studio");
        assert_eq!(stored.contact_phone, "555-0199");
        assert_eq!(stored.fullname, "Jess Doe");

        let mut ghost = u.clone();
        ghost.id = "user-999".to_string();
        assert!(ledger.update_profile(ghost).is_err());
    }

    #[test]
    fn mark_paid_is_one_way() {
        let mut ledger = Ledger::in_memory();
        let u = ledger.register_user(profile("jess@doe.test")).unwrap();
        let d = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let inv = ledger
            .add_invoice(
                &u.id,
                "INV-001",
                "Acme",
                "",
                "",
                vec![LineItem { name: "Work".to_string(), price: 100.0 }],
                0.0,
                "",
                d + chrono::Duration::days(14),
                d,
            )
            .unwrap();

        ledger.mark_invoice_paid(&u.id, &inv.id).unwrap();
        assert!(ledger.mark_invoice_paid(&u.id, &inv.id).is_err());
    }

    #[test]
    fn invoices_are_scoped_by_user() {
        let mut ledger = Ledger::in_memory();
        let a = ledger.register_user(profile("a@x.test")).unwrap();
        let b = ledger.register_user(profile("b@x.test")).unwrap();
        let d = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        ledger
            .add_invoice(
                &a.id,
                "INV-001",
                "Acme",
                "",
                "",
                vec![LineItem { name: "Work".to_string(), price: 1.0 }],
                0.0,
                "",
                d,
                d,
            )
            .unwrap();
        assert_eq!(ledger.invoices_for(&a.id).len(), 1);
        assert!(ledger.invoices_for(&b.id).is_empty());
    }

    #[test]
    fn conversations_replay_oldest_first() {
        let mut ledger = Ledger::in_memory();
        let u = ledger.register_user(profile("jess@doe.test")).unwrap();
        ledger.add_conversation(&u.id, "second", "r2", "2026-08-02T00:00:00Z");
        ledger.add_conversation(&u.id, "first", "r1", "2026-08-01T00:00:00Z");
        let turns = ledger.conversations_for(&u.id);
        assert_eq!(turns[0].prompt, "first");
        assert_eq!(turns[1].prompt, "second");
    }

    #[test]
    fn empty_invoice_rejected() {
        let mut ledger = Ledger::in_memory();
        let u = ledger.register_user(profile("jess@doe.test")).unwrap();
        let d = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(
            ledger
                .add_invoice(&u.id, "INV-001", "Acme", "", "", vec![], 0.0, "", d, d)
                .is_err()
        );
    }
}
