//! Next-month income forecast over recent monthly totals.
//!
//! Not a model, just a trend estimate: average the non-zero months, then
//! tilt by comparing the mean of the most recent three against the mean
//! of the months before them, with a ±10% band counting as stable.

use serde::{Deserialize, Serialize};

/// Income for one calendar month. Chronological order (oldest first) is
/// the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyIncome {
    pub month: u32,
    pub year: i32,
    pub total: f64,
    /// Paid invoices that contributed to the total.
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trend {
    #[serde(rename = "increasing")]
    Increasing,
    #[serde(rename = "decreasing")]
    Decreasing,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "insufficient_data")]
    InsufficientData,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Confidence {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeForecast {
    /// Predicted income for next month; never negative.
    pub prediction: f64,
    pub confidence: Confidence,
    pub trend: Trend,
    /// Percent change of recent mean vs earlier mean.
    pub growth_rate: f64,
    pub average_monthly_income: f64,
    pub months_analyzed: usize,
}

/// Percent band within which the trend counts as stable.
const STABLE_BAND_PCT: f64 = 10.0;

/// Forecast next month from up to the last six months of history.
/// Months with zero income are ignored; zero usable months yields a
/// cannot-predict result with prediction 0.
pub fn predict(history: &[MonthlyIncome]) -> IncomeForecast {
    let with_income: Vec<&MonthlyIncome> = history.iter().filter(|m| m.total > 0.0).collect();

    if with_income.is_empty() {
        return IncomeForecast {
            prediction: 0.0,
            confidence: Confidence::Low,
            trend: Trend::InsufficientData,
            growth_rate: 0.0,
            average_monthly_income: 0.0,
            months_analyzed: 0,
        };
    }

    let total: f64 = with_income.iter().map(|m| m.total).sum();
    let average = total / with_income.len() as f64;

    let mut trend = Trend::Stable;
    let mut growth_rate = 0.0;

    if with_income.len() >= 3 {
        let recent = &with_income[with_income.len() - 3..];
        let earlier = &with_income[..with_income.len() - 3];
        // Compare against at most three earlier months.
        let earlier = if earlier.len() > 3 { &earlier[earlier.len() - 3..] } else { earlier };

        if !earlier.is_empty() {
            let recent_avg: f64 = recent.iter().map(|m| m.total).sum::<f64>() / recent.len() as f64;
            let earlier_avg: f64 =
                earlier.iter().map(|m| m.total).sum::<f64>() / earlier.len() as f64;

            growth_rate = (recent_avg - earlier_avg) / earlier_avg * 100.0;
            if growth_rate > STABLE_BAND_PCT {
                trend = Trend::Increasing;
            } else if growth_rate < -STABLE_BAND_PCT {
                trend = Trend::Decreasing;
            }
        }
    }

    let prediction = match trend {
        Trend::Increasing | Trend::Decreasing => average * (1.0 + growth_rate / 100.0),
        _ => average,
    };

    let confidence = if with_income.len() >= 6 {
        Confidence::High
    } else if with_income.len() >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    IncomeForecast {
        prediction: prediction.max(0.0),
        confidence,
        trend,
        growth_rate,
        average_monthly_income: average,
        months_analyzed: with_income.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(totals: &[f64]) -> Vec<MonthlyIncome> {
        totals
            .iter()
            .enumerate()
            .map(|(i, t)| MonthlyIncome {
                month: (i % 12 + 1) as u32,
                year: 2026,
                total: *t,
                count: if *t > 0.0 { 1 } else { 0 },
            })
            .collect()
    }

    #[test]
    fn no_income_cannot_predict() {
        let f = predict(&months(&[0.0, 0.0, 0.0]));
        assert_eq!(f.prediction, 0.0);
        assert_eq!(f.trend, Trend::InsufficientData);
        assert_eq!(f.confidence, Confidence::Low);
        assert_eq!(f.months_analyzed, 0);
    }

    #[test]
    fn two_months_is_low_confidence_average() {
        let f = predict(&months(&[1000.0, 2000.0]));
        assert_eq!(f.confidence, Confidence::Low);
        assert_eq!(f.trend, Trend::Stable);
        assert_eq!(f.prediction, 1500.0);
        assert_eq!(f.months_analyzed, 2);
    }

    #[test]
    fn six_months_is_high_confidence() {
        let f = predict(&months(&[1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0]));
        assert_eq!(f.confidence, Confidence::High);
        assert_eq!(f.trend, Trend::Stable);
        assert_eq!(f.prediction, 1000.0);
    }

    #[test]
    fn rising_income_tilts_prediction_up() {
        // Earlier mean 1000, recent mean 2000 -> +100% growth.
        let f = predict(&months(&[1000.0, 1000.0, 1000.0, 2000.0, 2000.0, 2000.0]));
        assert_eq!(f.trend, Trend::Increasing);
        assert!((f.growth_rate - 100.0).abs() < 1e-9);
        // Average 1500, tilted by +100%.
        assert!((f.prediction - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn falling_income_never_predicts_negative() {
        let f = predict(&months(&[5000.0, 5000.0, 5000.0, 1.0, 1.0, 1.0]));
        assert_eq!(f.trend, Trend::Decreasing);
        assert!(f.prediction >= 0.0);
    }

    #[test]
    fn small_wobble_stays_stable() {
        // Recent mean within 10% of earlier mean.
        let f = predict(&months(&[1000.0, 1000.0, 1000.0, 1050.0, 1050.0, 1050.0]));
        assert_eq!(f.trend, Trend::Stable);
        assert_eq!(f.prediction, f.average_monthly_income);
    }

    #[test]
    fn zero_months_are_skipped() {
        let f = predict(&months(&[0.0, 1200.0, 0.0, 1400.0]));
        assert_eq!(f.months_analyzed, 2);
        assert_eq!(f.confidence, Confidence::Low);
        assert_eq!(f.prediction, 1300.0);
    }
}
