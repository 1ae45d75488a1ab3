//! Intent classification: map a free-text prompt to one answer handler.
//!
//! This is deterministic and non-LLM-first, like the rest of gigbooks:
//! an explicit ranked table of matchers is evaluated in a single pass and
//! the first hit wins. No scoring, no intent combination. Prompts that ask
//! for generated prose (emails, letters, apologies) are excluded up front
//! so they always reach the fallback generator, even when they also
//! mention invoices or overdue work.

use std::sync::OnceLock;

use regex::Regex;

/// Which month a prompt is talking about. Resolution to a concrete
/// (month, year) happens against the caller's "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthRef {
    This,
    Last,
    /// A named calendar month, 1-12. Resolves to its most recent
    /// occurrence: a month after the current one means last year.
    Named(u32),
}

impl MonthRef {
    pub fn resolve(&self, today: chrono::NaiveDate) -> (u32, i32) {
        use chrono::Datelike;
        match self {
            MonthRef::This => (today.month(), today.year()),
            MonthRef::Last => {
                if today.month() == 1 {
                    (12, today.year() - 1)
                } else {
                    (today.month() - 1, today.year())
                }
            }
            MonthRef::Named(m) => {
                if *m > today.month() {
                    (*m, today.year() - 1)
                } else {
                    (*m, today.year())
                }
            }
        }
    }
}

/// Secondary filter inside the general invoice-stats intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The user wants prose written for them; always the fallback path.
    WritingRequest,
    HowTo,
    UnpaidDetail,
    UnpaidThisMonth,
    NeedsAttention,
    OverdueCheck,
    PerformanceSummary,
    IncomeByMonth(MonthRef),
    IncomeHistory { months: u32 },
    IncomePrediction,
    YearToDate,
    TotalIncome,
    OutstandingAmount,
    DueSoon,
    AtRisk,
    DueToday,
    DaysLeft,
    InvoiceStats { filter: Option<StatusFilter> },
    ExpenseStats,
    ProfileInfo,
    SalesStats(MonthRef),
    /// Nothing matched; hand the prompt to the fallback generator.
    Unmatched,
}

impl Intent {
    /// True when the prompt should go to the generative fallback instead
    /// of a data handler.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Intent::WritingRequest | Intent::Unmatched)
    }
}

/// Classify a prompt. Case-insensitive; first matching rule in priority
/// order wins.
pub fn classify(prompt: &str) -> Intent {
    let p = prompt.to_lowercase();
    for matcher in MATCHERS {
        if let Some(intent) = matcher(&p) {
            return intent;
        }
    }
    Intent::Unmatched
}

type Matcher = fn(&str) -> Option<Intent>;

/// Priority-ordered rule table. Order is the contract: writing-request
/// exclusion first, then narrow data intents before broad ones.
const MATCHERS: &[Matcher] = &[
    match_writing_request,
    match_how_to,
    match_unpaid_detail,
    match_unpaid_this_month,
    match_needs_attention,
    match_overdue_check,
    match_performance_summary,
    match_income_by_month,
    match_income_history,
    match_income_prediction,
    match_year_to_date,
    match_total_income,
    match_outstanding_amount,
    match_due_soon,
    match_at_risk,
    match_due_today,
    match_days_left,
    match_invoice_stats,
    match_expense_stats,
    match_profile_info,
    match_sales_stats,
];

fn contains_any(p: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| p.contains(n))
}

fn match_writing_request(p: &str) -> Option<Intent> {
    let direct = [
        "write", "draft", "compose", "letter", "apology", "apologise", "apologize",
    ];
    let phrases = ["reminder for", "follow up with", "follow-up email", "follow up email"];
    // "email" alone is ambiguous ("what's my email?"); it only counts as a
    // writing request next to a prose verb.
    let email_verbs = ["send", "reminder", "follow up", "message"];

    if contains_any(p, &direct)
        || contains_any(p, &phrases)
        || (p.contains("email") && contains_any(p, &email_verbs))
    {
        return Some(Intent::WritingRequest);
    }
    None
}

fn match_how_to(p: &str) -> Option<Intent> {
    contains_any(
        p,
        &["how do i", "how can i", "where do i", "where can i", "how to create", "how to add", "how to mark"],
    )
    .then_some(Intent::HowTo)
}

fn match_unpaid_detail(p: &str) -> Option<Intent> {
    let asking_why = contains_any(p, &["why", "reason"]);
    let mentions_unpaid =
        contains_any(p, &["unpaid", "not paid", "haven't been paid", "not been paid"]);
    (asking_why && mentions_unpaid).then_some(Intent::UnpaidDetail)
}

fn match_unpaid_this_month(p: &str) -> Option<Intent> {
    let mentions_unpaid = contains_any(p, &["unpaid", "not paid"]);
    (mentions_unpaid && p.contains("this month")).then_some(Intent::UnpaidThisMonth)
}

fn match_needs_attention(p: &str) -> Option<Intent> {
    contains_any(p, &["attention", "chase", "follow up on"]).then_some(Intent::NeedsAttention)
}

fn match_overdue_check(p: &str) -> Option<Intent> {
    contains_any(p, &["overdue", "past due", "late invoice", "running late"])
        .then_some(Intent::OverdueCheck)
}

fn match_performance_summary(p: &str) -> Option<Intent> {
    contains_any(
        p,
        &["how am i doing", "how is my business", "how's my business", "business doing", "performance"],
    )
    .then_some(Intent::PerformanceSummary)
}

fn income_words(p: &str) -> bool {
    contains_any(p, &["income", "revenue", "earn", "made", "make money"])
}

fn match_income_by_month(p: &str) -> Option<Intent> {
    if !income_words(p) {
        return None;
    }
    extract_month_ref(p).map(Intent::IncomeByMonth)
}

fn match_income_history(p: &str) -> Option<Intent> {
    if !income_words(p) && !p.contains("history") && !p.contains("trend") {
        return None;
    }
    if let Some(n) = extract_last_n_months(p) {
        return Some(Intent::IncomeHistory { months: n });
    }
    if contains_any(p, &["income history", "income trend", "past few months", "last few months"]) {
        return Some(Intent::IncomeHistory { months: 6 });
    }
    None
}

fn match_income_prediction(p: &str) -> Option<Intent> {
    if contains_any(p, &["predict", "forecast", "projection", "project my"]) {
        return Some(Intent::IncomePrediction);
    }
    (income_words(p) && p.contains("next month")).then_some(Intent::IncomePrediction)
}

fn match_year_to_date(p: &str) -> Option<Intent> {
    if contains_any(p, &["year to date", "year-to-date", "ytd"]) {
        return Some(Intent::YearToDate);
    }
    (income_words(p) && p.contains("this year")).then_some(Intent::YearToDate)
}

fn match_total_income(p: &str) -> Option<Intent> {
    if contains_any(p, &["total income", "total revenue", "total earnings"]) {
        return Some(Intent::TotalIncome);
    }
    contains_any(p, &["how much have i earned", "how much have i made", "how much did i earn"])
        .then_some(Intent::TotalIncome)
}

fn match_outstanding_amount(p: &str) -> Option<Intent> {
    contains_any(p, &["outstanding", "owed", "owe me", "owes me", "uncollected", "waiting to be paid"])
        .then_some(Intent::OutstandingAmount)
}

fn match_due_soon(p: &str) -> Option<Intent> {
    if p.contains("due soon") {
        return Some(Intent::DueSoon);
    }
    (p.contains("due") && contains_any(p, &["this week", "upcoming", "coming up", "next few days"]))
        .then_some(Intent::DueSoon)
}

fn match_at_risk(p: &str) -> Option<Intent> {
    contains_any(p, &["at risk", "at-risk", "risky"]).then_some(Intent::AtRisk)
}

fn match_due_today(p: &str) -> Option<Intent> {
    (p.contains("due") && p.contains("today")).then_some(Intent::DueToday)
}

fn match_days_left(p: &str) -> Option<Intent> {
    if contains_any(p, &["days left", "days until", "days till"]) {
        return Some(Intent::DaysLeft);
    }
    (contains_any(p, &["how long until", "how long till"]) && p.contains("due"))
        .then_some(Intent::DaysLeft)
}

fn match_invoice_stats(p: &str) -> Option<Intent> {
    if !p.contains("invoice") {
        return None;
    }
    // "unpaid" contains "paid"; test the longer word first. The overdue
    // arm is shadowed through classify() because match_overdue_check
    // runs earlier in the table; it applies only when this filter is
    // driven directly.
    let filter = if p.contains("unpaid") || p.contains("pending") {
        Some(StatusFilter::Pending)
    } else if p.contains("paid") {
        Some(StatusFilter::Paid)
    } else if p.contains("overdue") {
        Some(StatusFilter::Overdue)
    } else {
        None
    };
    Some(Intent::InvoiceStats { filter })
}

fn match_expense_stats(p: &str) -> Option<Intent> {
    contains_any(p, &["expense", "spend", "spent", "spending"]).then_some(Intent::ExpenseStats)
}

fn match_profile_info(p: &str) -> Option<Intent> {
    contains_any(
        p,
        &["profile", "my name", "my business", "my phone", "my address", "my email", "who am i"],
    )
    .then_some(Intent::ProfileInfo)
}

fn match_sales_stats(p: &str) -> Option<Intent> {
    if !contains_any(p, &["sale", "sales", "sold"]) {
        return None;
    }
    Some(Intent::SalesStats(extract_month_ref(p).unwrap_or(MonthRef::This)))
}

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Full English name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June",
        "July", "August", "September", "October", "November", "December",
    ];
    NAMES[((month.clamp(1, 12)) - 1) as usize]
}

fn extract_month_ref(p: &str) -> Option<MonthRef> {
    if p.contains("last month") {
        return Some(MonthRef::Last);
    }
    if p.contains("this month") {
        return Some(MonthRef::This);
    }
    for (i, name) in MONTH_NAMES.iter().enumerate() {
        if p.contains(name) {
            return Some(MonthRef::Named((i + 1) as u32));
        }
    }
    None
}

fn extract_last_n_months(p: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:last|past)\s+(\d{1,2})\s+months").expect("valid regex")
    });
    re.captures(p)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn writing_request_beats_everything() {
        // Contains "overdue" and "invoice", but asks for prose.
        assert_eq!(
            classify("Write a reminder email for my overdue invoice"),
            Intent::WritingRequest
        );
        assert_eq!(classify("draft an apology to my client"), Intent::WritingRequest);
        assert_eq!(classify("compose a letter about unpaid work"), Intent::WritingRequest);
        assert!(classify("follow up with Acme about the invoice").is_fallback());
    }

    #[test]
    fn my_email_is_profile_not_writing() {
        assert_eq!(classify("what is my email address?"), Intent::ProfileInfo);
    }

    #[test]
    fn unpaid_why_routes_to_detail() {
        assert_eq!(
            classify("Why haven't been paid on two invoices?"),
            Intent::UnpaidDetail
        );
        assert_eq!(classify("reason my invoices are unpaid"), Intent::UnpaidDetail);
    }

    #[test]
    fn overdue_check_matches() {
        assert_eq!(classify("Am I overdue on anything?"), Intent::OverdueCheck);
        assert_eq!(classify("anything past due?"), Intent::OverdueCheck);
    }

    #[test]
    fn invoice_stats_with_subfilters() {
        assert_eq!(
            classify("How many invoices do I have?"),
            Intent::InvoiceStats { filter: None }
        );
        assert_eq!(
            classify("how many pending invoices"),
            Intent::InvoiceStats { filter: Some(StatusFilter::Pending) }
        );
        assert_eq!(
            classify("count of paid invoices"),
            Intent::InvoiceStats { filter: Some(StatusFilter::Paid) }
        );
        // "unpaid" must not be read as "paid".
        assert_eq!(
            classify("how many unpaid invoices do i have"),
            Intent::InvoiceStats { filter: Some(StatusFilter::Pending) }
        );
    }

    #[test]
    fn overdue_wording_always_wins_over_invoice_counts() {
        // "overdue" routes to the overdue check even when the prompt is
        // phrased as a count; the invoice-stats overdue filter never
        // fires through classify().
        assert_eq!(
            classify("how many overdue invoices do i have"),
            Intent::OverdueCheck
        );
    }

    #[test]
    fn prediction_beats_generic_income() {
        assert_eq!(classify("Predict my income next month"), Intent::IncomePrediction);
        assert_eq!(classify("forecast my revenue"), Intent::IncomePrediction);
    }

    #[test]
    fn income_by_named_month() {
        assert_eq!(
            classify("how much income did I make in March?"),
            Intent::IncomeByMonth(MonthRef::Named(3))
        );
        assert_eq!(
            classify("income last month"),
            Intent::IncomeByMonth(MonthRef::Last)
        );
    }

    #[test]
    fn income_history_extracts_n() {
        assert_eq!(
            classify("show my income over the last 4 months"),
            Intent::IncomeHistory { months: 4 }
        );
        assert_eq!(
            classify("what's my income trend over the last few months"),
            Intent::IncomeHistory { months: 6 }
        );
    }

    #[test]
    fn year_to_date_and_total() {
        assert_eq!(classify("year to date income"), Intent::YearToDate);
        assert_eq!(classify("how much have i earned in total"), Intent::TotalIncome);
    }

    #[test]
    fn due_views() {
        assert_eq!(classify("what's due soon"), Intent::DueSoon);
        assert_eq!(classify("anything due today?"), Intent::DueToday);
        assert_eq!(classify("how many days until INV-3 is due"), Intent::DaysLeft);
        assert_eq!(classify("which clients are at risk"), Intent::AtRisk);
    }

    #[test]
    fn sales_defaults_to_this_month() {
        assert_eq!(classify("how are my sales"), Intent::SalesStats(MonthRef::This));
        assert_eq!(
            classify("sales for last month"),
            Intent::SalesStats(MonthRef::Last)
        );
    }

    #[test]
    fn how_to_routes_before_data_intents() {
        assert_eq!(classify("how do i create an invoice"), Intent::HowTo);
    }

    #[test]
    fn nonsense_is_unmatched() {
        assert_eq!(classify("what's the weather like"), Intent::Unmatched);
        assert!(classify("tell me a joke").is_fallback());
    }

    #[test]
    fn month_ref_resolution() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(MonthRef::This.resolve(today), (8, 2026));
        assert_eq!(MonthRef::Last.resolve(today), (7, 2026));
        // March already happened this year.
        assert_eq!(MonthRef::Named(3).resolve(today), (3, 2026));
        // November hasn't; most recent one was last year.
        assert_eq!(MonthRef::Named(11).resolve(today), (11, 2025));

        let january = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(MonthRef::Last.resolve(january), (12, 2025));
    }
}
