//! Currency formatting for assistant replies.
//!
//! One fixed convention everywhere: a dollar sign and exactly two decimal
//! places. `parse_usd` is the inverse, so formatted amounts round-trip.

use anyhow::{Result, anyhow};

/// Format an amount as `$1234.56`.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Parse a string produced by [`format_usd`] (leading `$` optional,
/// commas tolerated) back into a numeric amount.
pub fn parse_usd(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|e| anyhow!("invalid currency string '{s}': {e}"))
}

/// Round to cents. Aggregate sums over f64 can pick up noise; replies
/// compare and report at 2 decimal places.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
