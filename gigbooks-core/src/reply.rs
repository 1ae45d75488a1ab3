//! Deterministic reply rendering: aggregate data in, one English answer out.
//!
//! Every function here is pure. The same aggregates always produce the
//! same string, counts drive singular/plural wording, money goes through
//! `money::format_usd`, and list answers show at most three items before
//! summarizing the rest.

use crate::aggregates::{ExpenseStats, IncomeMonth, InvoiceStats, SalesStats, UnpaidContext, YearToDate};
use crate::duedate::InvoiceAging;
use crate::forecast::{Confidence, IncomeForecast, Trend};
use crate::intent::{StatusFilter, month_name};
use crate::money::format_usd;
use crate::types::UserProfile;

/// Maximum items named in a list answer before "...and N more".
pub const LIST_LIMIT: usize = 3;

/// "1 invoice" / "4 invoices".
pub fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("1 {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn is_are(n: usize) -> &'static str {
    if n == 1 { "is" } else { "are" }
}

fn day_word(n: i64) -> &'static str {
    if n == 1 { "day" } else { "days" }
}

/// Render up to [`LIST_LIMIT`] items, then a remainder summary.
/// Items must already be in the intent's defined order.
pub fn truncated_list(items: &[String]) -> String {
    let shown: Vec<&String> = items.iter().take(LIST_LIMIT).collect();
    let mut out = shown
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");
    if items.len() > LIST_LIMIT {
        out.push_str(&format!("\n...and {} more", items.len() - LIST_LIMIT));
    }
    out
}

fn aging_line(d: &InvoiceAging) -> String {
    if d.is_overdue {
        format!(
            "{} ({}) is {} {} overdue",
            d.client_name,
            format_usd(d.total),
            d.days_overdue,
            day_word(d.days_overdue)
        )
    } else if d.is_due_today() {
        format!("{} ({}) is due today", d.client_name, format_usd(d.total))
    } else {
        format!(
            "{} ({}) is due in {} {}",
            d.client_name,
            format_usd(d.total),
            d.days_till_due,
            day_word(d.days_till_due)
        )
    }
}

pub fn invoice_stats(stats: &InvoiceStats, filter: Option<StatusFilter>) -> String {
    match filter {
        Some(StatusFilter::Pending) => format!(
            "You have {} waiting on payment.",
            plural(stats.pending, "pending invoice")
        ),
        Some(StatusFilter::Paid) => {
            format!("You have {} — nice work.", plural(stats.paid, "paid invoice"))
        }
        Some(StatusFilter::Overdue) => {
            if stats.overdue == 0 {
                "None of your invoices are overdue right now.".to_string()
            } else {
                format!(
                    "{} {} overdue and worth chasing.",
                    plural(stats.overdue, "invoice"),
                    is_are(stats.overdue)
                )
            }
        }
        None => format!(
            "You have {} in total - {} paid, {} pending, {} overdue.",
            plural(stats.total, "invoice"),
            stats.paid,
            stats.pending,
            stats.overdue
        ),
    }
}

/// The "why haven't I been paid" answer. Shape depends on how many
/// invoices are unpaid: zero celebrates, one names the client and exact
/// day count, several summarize overdue vs pending and name the worst.
pub fn unpaid_detail(ctx: &UnpaidContext) -> String {
    if ctx.total_unpaid == 0 {
        return "You don't have any unpaid invoices. All invoices have been paid — great job staying on top of your finances!".to_string();
    }

    if ctx.total_unpaid == 1 {
        let inv = &ctx.details[0];
        if inv.is_overdue {
            return format!(
                "You have one unpaid invoice because it has passed its due date by {} {} and has not yet been paid. This invoice is for {}. Would you like me to help you draft a follow-up reminder?",
                inv.days_overdue,
                day_word(inv.days_overdue),
                inv.client_name
            );
        }
        if inv.days_till_due > 0 {
            return format!(
                "You have one unpaid invoice because it was issued recently and has not yet reached its due date (due in {} {}). This is normal, and no action is required right now. The invoice is for {}.",
                inv.days_till_due,
                day_word(inv.days_till_due),
                inv.client_name
            );
        }
        return format!(
            "You have one unpaid invoice for {}. It's currently pending and no action is required yet.",
            inv.client_name
        );
    }

    let mut out = format!("You have {} unpaid invoices. ", ctx.total_unpaid);

    if ctx.overdue_count > 0 && ctx.pending_count > 0 {
        out.push_str(&format!(
            "{} {} overdue and {} {} still pending. ",
            ctx.overdue_count,
            is_are(ctx.overdue_count),
            ctx.pending_count,
            is_are(ctx.pending_count)
        ));
    } else if ctx.overdue_count > 0 {
        out.push_str(&format!(
            "All {} have passed their due dates. ",
            ctx.overdue_count
        ));
    } else {
        out.push_str(&format!(
            "All {} {} still within their payment period. ",
            ctx.pending_count,
            is_are(ctx.pending_count)
        ));
    }

    if let Some(worst) = ctx.overdue().max_by_key(|d| d.days_overdue) {
        out.push_str(&format!(
            "The most overdue is for {}, which is {} {} late. ",
            worst.client_name,
            worst.days_overdue,
            day_word(worst.days_overdue)
        ));
    }

    out.push_str("Would you like help prioritizing follow-ups?");
    out
}

pub fn overdue_check(ctx: &UnpaidContext) -> String {
    let overdue: Vec<&InvoiceAging> = ctx.overdue().collect();
    if overdue.is_empty() {
        return "Good news — nothing is overdue. Every unpaid invoice is still within its payment window.".to_string();
    }

    let lines: Vec<String> = overdue.iter().map(|d| aging_line(d)).collect();
    format!(
        "Yes, {} {} overdue:\n{}\nA polite follow-up usually gets these moving.",
        plural(overdue.len(), "invoice"),
        is_are(overdue.len()),
        truncated_list(&lines)
    )
}

pub fn unpaid_this_month(ctx: &UnpaidContext, month: u32) -> String {
    if ctx.total_unpaid == 0 {
        return format!(
            "No unpaid invoices from {} — everything issued this month has been settled.",
            month_name(month)
        );
    }
    let lines: Vec<String> = ctx.details.iter().map(aging_line).collect();
    format!(
        "{} from {} {} still unpaid:\n{}",
        plural(ctx.total_unpaid, "invoice"),
        month_name(month),
        is_are(ctx.total_unpaid),
        truncated_list(&lines)
    )
}

pub fn needs_attention(ctx: &UnpaidContext) -> String {
    let urgent: Vec<&InvoiceAging> = ctx.at_risk();
    if urgent.is_empty() {
        return "Nothing needs your attention right now — no invoices are overdue or about to be.".to_string();
    }
    let lines: Vec<String> = urgent.iter().map(|d| aging_line(d)).collect();
    format!(
        "{} {} your attention:\n{}\nStart with the most overdue one.",
        plural(urgent.len(), "invoice"),
        if urgent.len() == 1 { "needs" } else { "need" },
        truncated_list(&lines)
    )
}

pub fn performance_summary(
    stats: &InvoiceStats,
    sales: &SalesStats,
    expenses: &ExpenseStats,
) -> String {
    let mut out = format!(
        "Here's how your business is doing: {} in total - {} paid, {} pending, {} overdue. ",
        plural(stats.total, "invoice"),
        stats.paid,
        stats.pending,
        stats.overdue
    );
    out.push_str(&format!(
        "This month you closed {} for {}. ",
        plural(sales.count, "sale"),
        format_usd(sales.total_sales)
    ));
    out.push_str(&format!(
        "Expenses so far: {} across {}.",
        format_usd(expenses.total_amount),
        plural(expenses.count, "expense")
    ));
    if stats.overdue > 0 {
        out.push_str(" Chasing the overdue invoices would be the quickest win.");
    } else {
        out.push_str(" Nothing overdue — keep it up!");
    }
    out
}

pub fn income_month(m: &IncomeMonth) -> String {
    if m.count == 0 {
        return format!(
            "No paid invoices in {} {}, so no income was recorded that month.",
            month_name(m.month),
            m.year
        );
    }
    format!(
        "In {} {} you earned {} from {} (highest {}, average {}).",
        month_name(m.month),
        m.year,
        format_usd(m.total_income),
        plural(m.count, "paid invoice"),
        format_usd(m.highest_sale),
        format_usd(m.average_sale)
    )
}

pub fn income_history(history: &[crate::forecast::MonthlyIncome]) -> String {
    if history.is_empty() {
        return "I don't have any income history to show yet.".to_string();
    }
    let total: f64 = history.iter().map(|m| m.total).sum();
    let mut out = format!(
        "Income over the last {}:\n",
        plural(history.len(), "month")
    );
    for m in history {
        out.push_str(&format!(
            "- {} {}: {}\n",
            month_name(m.month),
            m.year,
            format_usd(m.total)
        ));
    }
    out.push_str(&format!("Total: {}.", format_usd(total)));
    out
}

pub fn income_prediction(f: &IncomeForecast) -> String {
    if f.months_analyzed == 0 {
        return "Not enough data to make a prediction. Start tracking your income!".to_string();
    }

    let trend_text = match f.trend {
        Trend::Increasing => format!("trending up ({:+.1}%)", f.growth_rate),
        Trend::Decreasing => format!("trending down ({:+.1}%)", f.growth_rate),
        Trend::Stable => "holding steady".to_string(),
        Trend::InsufficientData => "too sparse to read a trend".to_string(),
    };

    let confidence_text = match f.confidence {
        Confidence::High => "high confidence",
        Confidence::Medium => "medium confidence",
        Confidence::Low => "low confidence",
    };

    let mut out = format!(
        "Based on {} of income data, next month looks like {} ({}). Your income is {}, averaging {} per month.",
        plural(f.months_analyzed, "month"),
        format_usd(f.prediction),
        confidence_text,
        trend_text,
        format_usd(f.average_monthly_income)
    );

    if f.confidence == Confidence::Low {
        out.push_str(" Keep tracking a few more months and this prediction will sharpen up.");
    }
    out
}

pub fn year_to_date(ytd: &YearToDate) -> String {
    if ytd.count == 0 {
        return format!("No income recorded yet in {}.", ytd.year);
    }
    format!(
        "So far in {} you've earned {} across {}.",
        ytd.year,
        format_usd(ytd.total_income),
        plural(ytd.count, "paid invoice")
    )
}

pub fn total_income(total: f64, count: usize) -> String {
    if count == 0 {
        return "You haven't recorded any paid invoices yet, so total income is $0.00.".to_string();
    }
    format!(
        "All time, you've collected {} across {}.",
        format_usd(total),
        plural(count, "paid invoice")
    )
}

pub fn outstanding_amount(ctx: &UnpaidContext) -> String {
    if ctx.total_unpaid == 0 {
        return "Nothing is outstanding — every invoice has been paid.".to_string();
    }
    format!(
        "{} {} outstanding, worth {} in total. {} of them {} already overdue.",
        plural(ctx.total_unpaid, "invoice"),
        is_are(ctx.total_unpaid),
        format_usd(ctx.outstanding_total()),
        ctx.overdue_count,
        is_are(ctx.overdue_count)
    )
}

pub fn due_soon(ctx: &UnpaidContext) -> String {
    let soon = ctx.due_soon();
    if soon.is_empty() {
        return "Nothing is due in the next 7 days. You're all clear for the week!".to_string();
    }
    let lines: Vec<String> = soon.iter().map(|d| aging_line(d)).collect();
    format!(
        "{} {} due within 7 days:\n{}\nA friendly heads-up to these clients now can prevent late payments.",
        plural(soon.len(), "invoice"),
        is_are(soon.len()),
        truncated_list(&lines)
    )
}

pub fn at_risk(ctx: &UnpaidContext) -> String {
    let risky = ctx.at_risk();
    if risky.is_empty() {
        return "No invoices are at risk — nothing overdue and nothing due in the next 3 days.".to_string();
    }
    let lines: Vec<String> = risky.iter().map(|d| aging_line(d)).collect();
    format!(
        "{} {} at risk:\n{}\nPrioritize the overdue ones first.",
        plural(risky.len(), "invoice"),
        is_are(risky.len()),
        truncated_list(&lines)
    )
}

pub fn due_today(ctx: &UnpaidContext) -> String {
    let today = ctx.due_today();
    if today.is_empty() {
        return "Nothing is due today.".to_string();
    }
    let lines: Vec<String> = today.iter().map(|d| aging_line(d)).collect();
    format!(
        "{} {} due today:\n{}",
        plural(today.len(), "invoice"),
        is_are(today.len()),
        truncated_list(&lines)
    )
}

pub fn days_left(ctx: &UnpaidContext) -> String {
    let mut upcoming: Vec<&InvoiceAging> =
        ctx.details.iter().filter(|d| !d.is_overdue).collect();
    upcoming.sort_by_key(|d| d.days_till_due);

    if upcoming.is_empty() {
        if ctx.overdue_count > 0 {
            return "No upcoming due dates — every unpaid invoice is already past due.".to_string();
        }
        return "No unpaid invoices, so there are no due dates to count down.".to_string();
    }

    let lines: Vec<String> = upcoming.iter().map(|d| aging_line(d)).collect();
    format!("Here's what's coming up:\n{}", truncated_list(&lines))
}

pub fn expense_stats(stats: &ExpenseStats) -> String {
    if stats.count == 0 {
        return "You haven't recorded any expenses yet.".to_string();
    }
    let lines: Vec<String> = stats
        .by_category
        .iter()
        .map(|(cat, amt)| format!("{}: {}", cat, format_usd(*amt)))
        .collect();
    format!(
        "You've recorded {} totalling {}. By category:\n{}",
        plural(stats.count, "expense"),
        format_usd(stats.total_amount),
        truncated_list(&lines)
    )
}

/// Expense answer narrowed to one category named in the prompt.
pub fn expense_category(category: &str, stats: &ExpenseStats) -> String {
    if stats.count == 0 {
        return format!("No expenses recorded under {category} yet.");
    }
    format!(
        "You've spent {} on {} across {}.",
        format_usd(stats.total_amount),
        category,
        plural(stats.count, "expense")
    )
}

pub fn profile_info(user: &UserProfile) -> String {
    format!(
        "Here's your profile: {} ({}), business \"{}\", phone {}, address {}.",
        user.fullname, user.email, user.business, user.contact_phone, user.contact_address
    )
}

pub fn sales_stats(s: &SalesStats) -> String {
    if s.count == 0 {
        return format!(
            "No sales recorded in {} {} yet.",
            month_name(s.month),
            s.year
        );
    }
    format!(
        "In {} {} you made {} for {} total; your biggest single sale was {}.",
        month_name(s.month),
        s.year,
        plural(s.count, "sale"),
        format_usd(s.total_sales),
        format_usd(s.highest_sale)
    )
}

pub fn how_to() -> String {
    "Here's how to get around:\n\
- create an invoice: gigbooks invoice add --client <name> --item <name=price> --due <YYYY-MM-DD>\n\
- mark one paid: gigbooks invoice mark-paid --id <invoice-id>\n\
- record an expense: gigbooks expense add --amount <n> --category <cat> --description <text>\n\
- see the big picture: gigbooks summary"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duedate::InvoiceAging;
    use chrono::NaiveDate;

    fn aging(client: &str, total: f64, days_overdue: i64, days_till_due: i64) -> InvoiceAging {
        InvoiceAging {
            invoice_id: format!("inv-{client}"),
            client_name: client.to_string(),
            total,
            due_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            days_overdue,
            days_till_due,
            is_overdue: days_overdue > 0,
            is_pending: days_overdue == 0,
        }
    }

    fn ctx(details: Vec<InvoiceAging>) -> UnpaidContext {
        let overdue_count = details.iter().filter(|d| d.is_overdue).count();
        UnpaidContext {
            total_unpaid: details.len(),
            overdue_count,
            pending_count: details.len() - overdue_count,
            details,
        }
    }

    #[test]
    fn invoice_stats_states_all_counts() {
        let s = InvoiceStats { total: 4, paid: 2, pending: 1, overdue: 1 };
        let out = invoice_stats(&s, None);
        assert_eq!(
            out,
            "You have 4 invoices in total - 2 paid, 1 pending, 1 overdue."
        );
    }

    #[test]
    fn invoice_stats_singular() {
        let s = InvoiceStats { total: 1, paid: 0, pending: 1, overdue: 0 };
        assert!(invoice_stats(&s, None).starts_with("You have 1 invoice in total"));
    }

    #[test]
    fn unpaid_detail_zero_celebrates() {
        let out = unpaid_detail(&ctx(vec![]));
        assert!(out.contains("don't have any unpaid invoices"));
    }

    #[test]
    fn unpaid_detail_single_names_client_and_days() {
        let out = unpaid_detail(&ctx(vec![aging("Acme", 500.0, 4, 0)]));
        assert!(out.contains("4 days"));
        assert!(out.contains("Acme"));

        let single_day = unpaid_detail(&ctx(vec![aging("Acme", 500.0, 1, 0)]));
        assert!(single_day.contains("1 day "));
        assert!(!single_day.contains("1 days"));
    }

    #[test]
    fn unpaid_detail_many_names_most_overdue() {
        let out = unpaid_detail(&ctx(vec![
            aging("Acme", 500.0, 4, 0),
            aging("Globex", 900.0, 12, 0),
            aging("Initech", 250.0, 0, 5),
        ]));
        assert!(out.contains("3 unpaid invoices"));
        assert!(out.contains("2 are overdue and 1 is still pending"));
        assert!(out.contains("most overdue is for Globex"));
        assert!(out.contains("12 days late"));
    }

    #[test]
    fn overdue_check_all_clear() {
        let out = overdue_check(&ctx(vec![aging("Acme", 100.0, 0, 6)]));
        assert!(out.contains("nothing is overdue"));
    }

    #[test]
    fn truncation_shows_three_plus_remainder() {
        let items: Vec<String> = (1..=5).map(|i| format!("item {i}")).collect();
        let out = truncated_list(&items);
        assert!(out.contains("item 1"));
        assert!(out.contains("item 3"));
        assert!(!out.contains("item 4"));
        assert!(out.ends_with("...and 2 more"));
    }

    #[test]
    fn truncation_noop_at_three_or_fewer() {
        let items: Vec<String> = (1..=3).map(|i| format!("item {i}")).collect();
        let out = truncated_list(&items);
        assert!(out.contains("item 3"));
        assert!(!out.contains("more"));
    }

    #[test]
    fn formatter_is_deterministic() {
        let c = ctx(vec![aging("Acme", 500.0, 4, 0), aging("Globex", 900.0, 12, 0)]);
        assert_eq!(unpaid_detail(&c), unpaid_detail(&c));
        assert_eq!(overdue_check(&c), overdue_check(&c));
    }

    #[test]
    fn prediction_low_confidence_recommends_more_tracking() {
        let f = crate::forecast::predict(&[
            crate::forecast::MonthlyIncome { month: 6, year: 2026, total: 900.0, count: 1 },
            crate::forecast::MonthlyIncome { month: 7, year: 2026, total: 1100.0, count: 2 },
        ]);
        let out = income_prediction(&f);
        assert!(out.contains("low confidence"));
        assert!(out.contains("Keep tracking"));
    }

    #[test]
    fn expense_breakdown_truncates_categories() {
        let stats = ExpenseStats {
            count: 10,
            total_amount: 500.0,
            by_category: vec![
                ("Software".to_string(), 200.0),
                ("Travel".to_string(), 150.0),
                ("Meals".to_string(), 100.0),
                ("Office".to_string(), 50.0),
            ],
        };
        let out = expense_stats(&stats);
        assert!(out.contains("10 expenses"));
        assert!(out.contains("$500.00"));
        assert!(out.contains("...and 1 more"));
    }
}
