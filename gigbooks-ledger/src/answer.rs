//! The deterministic half of the prompt router: classify, aggregate,
//! format. `Ok(None)` means "hand this prompt to the fallback generator",
//! either because it's a writing request, because nothing matched, or
//! because the data a matched intent needed wasn't available. Data
//! problems never escape as hard errors from a matched intent.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use gigbooks_core::intent::{Intent, MonthRef, classify};
use gigbooks_core::reply;

use crate::stats;
use crate::store::Ledger;

/// Answer a prompt from stored data alone. Explicit user and today; the
/// router holds no session state.
pub fn answer_prompt(
    ledger: &Ledger,
    user_id: &str,
    prompt: &str,
    today: NaiveDate,
) -> Result<Option<String>> {
    let intent = classify(prompt);
    Ok(answer_intent(ledger, user_id, intent, prompt, today))
}

fn answer_intent(
    ledger: &Ledger,
    user_id: &str,
    intent: Intent,
    prompt: &str,
    today: NaiveDate,
) -> Option<String> {
    match intent {
        Intent::WritingRequest | Intent::Unmatched => None,

        Intent::HowTo => Some(reply::how_to()),

        Intent::UnpaidDetail => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::unpaid_detail(&ctx))
        }

        Intent::UnpaidThisMonth => {
            let ctx = stats::unpaid_context_for_month(
                ledger,
                user_id,
                today.month(),
                today.year(),
                today,
            );
            Some(reply::unpaid_this_month(&ctx, today.month()))
        }

        Intent::NeedsAttention => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::needs_attention(&ctx))
        }

        Intent::OverdueCheck => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::overdue_check(&ctx))
        }

        Intent::PerformanceSummary => {
            let invoice = stats::invoice_stats(ledger, user_id, today);
            let sales = stats::sales_stats(ledger, user_id, today.month(), today.year());
            let expenses = stats::expense_stats(ledger, user_id);
            Some(reply::performance_summary(&invoice, &sales, &expenses))
        }

        Intent::IncomeByMonth(month_ref) => {
            let (month, year) = month_ref.resolve(today);
            let m = stats::income_by_month(ledger, user_id, month, year);
            Some(reply::income_month(&m))
        }

        Intent::IncomeHistory { months } => {
            let history = stats::income_last_n_months(ledger, user_id, months, today);
            Some(reply::income_history(&history))
        }

        Intent::IncomePrediction => {
            let f = stats::income_forecast(ledger, user_id, today);
            Some(reply::income_prediction(&f))
        }

        Intent::YearToDate => {
            let ytd = stats::year_to_date(ledger, user_id, today);
            Some(reply::year_to_date(&ytd))
        }

        Intent::TotalIncome => {
            let (total, count) = stats::total_income(ledger, user_id);
            Some(reply::total_income(total, count))
        }

        Intent::OutstandingAmount => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::outstanding_amount(&ctx))
        }

        Intent::DueSoon => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::due_soon(&ctx))
        }

        Intent::AtRisk => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::at_risk(&ctx))
        }

        Intent::DueToday => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::due_today(&ctx))
        }

        Intent::DaysLeft => {
            let ctx = stats::unpaid_context(ledger, user_id, today);
            Some(reply::days_left(&ctx))
        }

        Intent::InvoiceStats { filter } => {
            let s = stats::invoice_stats(ledger, user_id, today);
            Some(reply::invoice_stats(&s, filter))
        }

        Intent::ExpenseStats => {
            let s = stats::expense_stats(ledger, user_id);
            // Known category named in the prompt narrows the answer.
            let p = prompt.to_lowercase();
            if let Some((category, _)) =
                s.by_category.iter().find(|(c, _)| p.contains(&c.to_lowercase()))
            {
                let cs = stats::expense_category_stats(ledger, user_id, category);
                return Some(reply::expense_category(category, &cs));
            }
            Some(reply::expense_stats(&s))
        }

        // Profile data can be missing (user deleted mid-session); fall
        // through to the generator rather than fail the pipeline.
        Intent::ProfileInfo => ledger.user(user_id).map(reply::profile_info),

        Intent::SalesStats(month_ref) => {
            let (month, year) = month_ref.resolve(today);
            let s = stats::sales_stats(ledger, user_id, month, year);
            Some(reply::sales_stats(&s))
        }
    }
}
