//! Financial aggregators: read-side summaries over one user's records.
//!
//! Every function takes the user and "today" explicitly, so results are
//! reproducible and the assistant never depends on ambient session state.
//! Overdue is always derived here from pending status plus a past due
//! date; nothing below trusts a stored overdue flag (there isn't one).

use chrono::{Datelike, NaiveDate};

use gigbooks_core::aggregates::{
    ExpenseStats, IncomeMonth, InvoiceStats, SalesStats, UnpaidContext, YearToDate,
};
use gigbooks_core::duedate::age_invoice;
use gigbooks_core::forecast::{self, IncomeForecast, MonthlyIncome};
use gigbooks_core::types::Invoice;

use crate::store::Ledger;

fn created_in(inv: &Invoice, month: u32, year: i32) -> bool {
    inv.created_at.month() == month && inv.created_at.year() == year
}

fn stats_over<'a>(invoices: impl Iterator<Item = &'a Invoice>, today: NaiveDate) -> InvoiceStats {
    let mut stats = InvoiceStats::default();
    for inv in invoices {
        stats.total += 1;
        if inv.is_paid() {
            stats.paid += 1;
        } else if age_invoice(inv, today).is_overdue {
            stats.overdue += 1;
        } else {
            stats.pending += 1;
        }
    }
    stats
}

/// Counts by derived status across all of a user's invoices.
pub fn invoice_stats(ledger: &Ledger, user_id: &str, today: NaiveDate) -> InvoiceStats {
    stats_over(ledger.invoices_for(user_id).into_iter(), today)
}

/// Counts by derived status for invoices created in one month.
pub fn invoice_stats_by_month(
    ledger: &Ledger,
    user_id: &str,
    month: u32,
    year: i32,
    today: NaiveDate,
) -> InvoiceStats {
    stats_over(
        ledger
            .invoices_for(user_id)
            .into_iter()
            .filter(|i| created_in(i, month, year)),
        today,
    )
}

fn unpaid_context_over<'a>(
    invoices: impl Iterator<Item = &'a Invoice>,
    today: NaiveDate,
) -> UnpaidContext {
    let mut details: Vec<_> = invoices
        .filter(|i| !i.is_paid())
        .map(|i| age_invoice(i, today))
        .collect();

    // Most overdue first, then soonest due.
    details.sort_by(|a, b| {
        b.days_overdue
            .cmp(&a.days_overdue)
            .then(a.days_till_due.cmp(&b.days_till_due))
    });

    let overdue_count = details.iter().filter(|d| d.is_overdue).count();
    UnpaidContext {
        total_unpaid: details.len(),
        overdue_count,
        pending_count: details.len() - overdue_count,
        details,
    }
}

/// Per-invoice aging for everything unpaid, most overdue first.
pub fn unpaid_context(ledger: &Ledger, user_id: &str, today: NaiveDate) -> UnpaidContext {
    unpaid_context_over(ledger.invoices_for(user_id).into_iter(), today)
}

/// Aging for unpaid invoices created in one month.
pub fn unpaid_context_for_month(
    ledger: &Ledger,
    user_id: &str,
    month: u32,
    year: i32,
    today: NaiveDate,
) -> UnpaidContext {
    unpaid_context_over(
        ledger
            .invoices_for(user_id)
            .into_iter()
            .filter(|i| created_in(i, month, year)),
        today,
    )
}

/// Expense count and total for a single category, matched
/// case-insensitively.
pub fn expense_category_stats(ledger: &Ledger, user_id: &str, category: &str) -> ExpenseStats {
    let matching: Vec<_> = ledger
        .expenses_for(user_id)
        .into_iter()
        .filter(|e| e.category.eq_ignore_ascii_case(category))
        .collect();
    let total_amount: f64 = matching.iter().map(|e| e.amount).sum();
    ExpenseStats {
        count: matching.len(),
        total_amount,
        by_category: vec![(category.to_string(), total_amount)],
    }
}

/// Expense count, total, and per-category breakdown (largest first).
pub fn expense_stats(ledger: &Ledger, user_id: &str) -> ExpenseStats {
    let expenses = ledger.expenses_for(user_id);
    let total_amount: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut by_category: Vec<(String, f64)> = Vec::new();
    for e in &expenses {
        match by_category.iter_mut().find(|(c, _)| *c == e.category) {
            Some((_, amt)) => *amt += e.amount,
            None => by_category.push((e.category.clone(), e.amount)),
        }
    }
    by_category.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    ExpenseStats { count: expenses.len(), total_amount, by_category }
}

fn paid_in_month<'a>(ledger: &'a Ledger, user_id: &str, month: u32, year: i32) -> Vec<&'a Invoice> {
    ledger
        .invoices_for(user_id)
        .into_iter()
        .filter(|i| i.is_paid() && created_in(i, month, year))
        .collect()
}

/// Sales figures over paid invoices created in one month.
pub fn sales_stats(ledger: &Ledger, user_id: &str, month: u32, year: i32) -> SalesStats {
    let paid = paid_in_month(ledger, user_id, month, year);
    let total_sales: f64 = paid.iter().map(|i| i.total()).sum();
    let highest_sale = paid.iter().map(|i| i.total()).fold(0.0, f64::max);
    SalesStats { count: paid.len(), total_sales, highest_sale, month, year }
}

/// Income detail for one month: sales stats plus an average.
pub fn income_by_month(ledger: &Ledger, user_id: &str, month: u32, year: i32) -> IncomeMonth {
    let s = sales_stats(ledger, user_id, month, year);
    let average_sale = if s.count > 0 { s.total_sales / s.count as f64 } else { 0.0 };
    IncomeMonth {
        count: s.count,
        total_income: s.total_sales,
        highest_sale: s.highest_sale,
        average_sale,
        month,
        year,
    }
}

/// Paid income per month for the last `n` months, oldest first.
pub fn income_last_n_months(
    ledger: &Ledger,
    user_id: &str,
    n: u32,
    today: NaiveDate,
) -> Vec<MonthlyIncome> {
    let mut out = Vec::with_capacity(n as usize);
    let mut month = today.month();
    let mut year = today.year();

    for _ in 0..n {
        let paid = paid_in_month(ledger, user_id, month, year);
        out.push(MonthlyIncome {
            month,
            year,
            total: paid.iter().map(|i| i.total()).sum(),
            count: paid.len(),
        });
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    out.reverse();
    out
}

/// Paid income across the current calendar year.
pub fn year_to_date(ledger: &Ledger, user_id: &str, today: NaiveDate) -> YearToDate {
    let year = today.year();
    let paid: Vec<&Invoice> = ledger
        .invoices_for(user_id)
        .into_iter()
        .filter(|i| i.is_paid() && i.created_at.year() == year)
        .collect();
    YearToDate {
        total_income: paid.iter().map(|i| i.total()).sum(),
        count: paid.len(),
        year,
    }
}

/// All-time collected income: (total, paid invoice count).
pub fn total_income(ledger: &Ledger, user_id: &str) -> (f64, usize) {
    let paid: Vec<&Invoice> = ledger
        .invoices_for(user_id)
        .into_iter()
        .filter(|i| i.is_paid())
        .collect();
    (paid.iter().map(|i| i.total()).sum(), paid.len())
}

/// Next-month income forecast from the last six months of history.
pub fn income_forecast(ledger: &Ledger, user_id: &str, today: NaiveDate) -> IncomeForecast {
    let history = income_last_n_months(ledger, user_id, 6, today);
    forecast::predict(&history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigbooks_core::types::{LineItem, UserProfile};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn seeded() -> (Ledger, String) {
        let mut ledger = Ledger::in_memory();
        let user = ledger
            .register_user(UserProfile {
                id: String::new(),
                fullname: "Jess Doe".to_string(),
                email: "jess@doe.test".to_string(),
                business: "Doe Design".to_string(),
                contact_phone: "555-0100".to_string(),
                contact_address: "2 High St".to_string(),
                password: "hunter2".to_string(),
            })
            .unwrap();
        (ledger, user.id)
    }

    fn add(
        ledger: &mut Ledger,
        user: &str,
        client: &str,
        price: f64,
        created: NaiveDate,
        due: NaiveDate,
        paid: bool,
    ) {
        let inv = ledger
            .add_invoice(
                user,
                "INV",
                client,
                "",
                "",
                vec![LineItem { name: "Work".to_string(), price }],
                0.0,
                "",
                due,
                created,
            )
            .unwrap();
        if paid {
            ledger.mark_invoice_paid(user, &inv.id).unwrap();
        }
    }

    #[test]
    fn overdue_is_derived_from_due_date() {
        let (mut ledger, user) = seeded();
        let today = d(2026, 8, 23);
        // Pending, due date passed -> overdue.
        add(&mut ledger, &user, "Acme", 100.0, d(2026, 7, 1), d(2026, 8, 1), false);
        // Pending, due in the future -> pending.
        add(&mut ledger, &user, "Globex", 100.0, d(2026, 8, 20), d(2026, 9, 3), false);
        // Paid stays paid no matter the due date.
        add(&mut ledger, &user, "Initech", 100.0, d(2026, 7, 1), d(2026, 7, 15), true);

        let s = invoice_stats(&ledger, &user, today);
        assert_eq!(s.total, 3);
        assert_eq!(s.paid, 1);
        assert_eq!(s.pending, 1);
        assert_eq!(s.overdue, 1);
    }

    #[test]
    fn unpaid_context_sorts_most_overdue_first() {
        let (mut ledger, user) = seeded();
        let today = d(2026, 8, 23);
        add(&mut ledger, &user, "Acme", 100.0, d(2026, 7, 1), d(2026, 8, 19), false); // 4 days
        add(&mut ledger, &user, "Globex", 100.0, d(2026, 6, 1), d(2026, 8, 11), false); // 12 days
        add(&mut ledger, &user, "Initech", 100.0, d(2026, 8, 20), d(2026, 8, 28), false); // due in 5

        let ctx = unpaid_context(&ledger, &user, today);
        assert_eq!(ctx.total_unpaid, 3);
        assert_eq!(ctx.overdue_count, 2);
        assert_eq!(ctx.details[0].client_name, "Globex");
        assert_eq!(ctx.details[1].client_name, "Acme");
        assert_eq!(ctx.details[2].client_name, "Initech");
    }

    #[test]
    fn sales_count_only_paid_in_month() {
        let (mut ledger, user) = seeded();
        add(&mut ledger, &user, "Acme", 500.0, d(2026, 8, 2), d(2026, 8, 16), true);
        add(&mut ledger, &user, "Globex", 900.0, d(2026, 8, 10), d(2026, 8, 24), true);
        add(&mut ledger, &user, "Initech", 250.0, d(2026, 8, 12), d(2026, 8, 26), false);
        add(&mut ledger, &user, "Umbrella", 700.0, d(2026, 7, 12), d(2026, 7, 26), true);

        let s = sales_stats(&ledger, &user, 8, 2026);
        assert_eq!(s.count, 2);
        assert_eq!(s.total_sales, 1400.0);
        assert_eq!(s.highest_sale, 900.0);
    }

    #[test]
    fn income_history_is_chronological() {
        let (mut ledger, user) = seeded();
        add(&mut ledger, &user, "Acme", 300.0, d(2026, 6, 5), d(2026, 6, 19), true);
        add(&mut ledger, &user, "Globex", 500.0, d(2026, 8, 5), d(2026, 8, 19), true);

        let history = income_last_n_months(&ledger, &user, 3, d(2026, 8, 23));
        assert_eq!(history.len(), 3);
        assert_eq!((history[0].month, history[0].total), (6, 300.0));
        assert_eq!((history[1].month, history[1].total), (7, 0.0));
        assert_eq!((history[2].month, history[2].total), (8, 500.0));
    }

    #[test]
    fn history_crosses_year_boundary() {
        let (ledger, user) = seeded();
        let history = income_last_n_months(&ledger, &user, 4, d(2026, 2, 10));
        let months: Vec<(u32, i32)> = history.iter().map(|m| (m.month, m.year)).collect();
        assert_eq!(months, vec![(11, 2025), (12, 2025), (1, 2026), (2, 2026)]);
    }

    #[test]
    fn monthly_invoice_stats_only_count_that_month() {
        let (mut ledger, user) = seeded();
        let today = d(2026, 8, 23);
        add(&mut ledger, &user, "Acme", 100.0, d(2026, 8, 2), d(2026, 8, 16), true);
        add(&mut ledger, &user, "Globex", 100.0, d(2026, 8, 10), d(2026, 9, 10), false);
        add(&mut ledger, &user, "Initech", 100.0, d(2026, 7, 1), d(2026, 7, 15), false);

        let s = invoice_stats_by_month(&ledger, &user, 8, 2026, today);
        assert_eq!(s.total, 2);
        assert_eq!(s.paid, 1);
        assert_eq!(s.pending, 1);
        assert_eq!(s.overdue, 0);
    }

    #[test]
    fn category_stats_match_case_insensitively() {
        let (mut ledger, user) = seeded();
        ledger.add_expense(&user, 40.0, "stock photos", "Software", d(2026, 8, 1));
        ledger.add_expense(&user, 60.0, "editor license", "Software", d(2026, 8, 5));
        ledger.add_expense(&user, 120.0, "flight", "Travel", d(2026, 8, 3));

        let s = expense_category_stats(&ledger, &user, "software");
        assert_eq!(s.count, 2);
        assert_eq!(s.total_amount, 100.0);
    }

    #[test]
    fn expense_breakdown_sorted_by_amount() {
        let (mut ledger, user) = seeded();
        ledger.add_expense(&user, 40.0, "stock photos", "Software", d(2026, 8, 1));
        ledger.add_expense(&user, 120.0, "flight", "Travel", d(2026, 8, 3));
        ledger.add_expense(&user, 60.0, "editor license", "Software", d(2026, 8, 5));

        let s = expense_stats(&ledger, &user);
        assert_eq!(s.count, 3);
        assert_eq!(s.total_amount, 220.0);
        assert_eq!(s.by_category[0], ("Travel".to_string(), 120.0));
        assert_eq!(s.by_category[1], ("Software".to_string(), 100.0));
    }

    #[test]
    fn year_to_date_ignores_last_year() {
        let (mut ledger, user) = seeded();
        add(&mut ledger, &user, "Acme", 800.0, d(2025, 12, 5), d(2025, 12, 19), true);
        add(&mut ledger, &user, "Globex", 500.0, d(2026, 3, 5), d(2026, 3, 19), true);

        let ytd = year_to_date(&ledger, &user, d(2026, 8, 23));
        assert_eq!(ytd.total_income, 500.0);
        assert_eq!(ytd.count, 1);
        assert_eq!(ytd.year, 2026);
    }

    #[test]
    fn forecast_uses_tax_inclusive_totals() {
        let (mut ledger, user) = seeded();
        for m in 3..=8u32 {
            add(&mut ledger, &user, "Acme", 1000.0, d(2026, m, 5), d(2026, m, 19), true);
        }
        let f = income_forecast(&ledger, &user, d(2026, 8, 23));
        assert_eq!(f.months_analyzed, 6);
        assert_eq!(f.prediction, 1000.0);
    }
}
