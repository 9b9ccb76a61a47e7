//! Next-month expense forecast
//!
//! Predicts next month's expense from a recency-weighted average of monthly
//! history, classifies the recent trend, and scores confidence from how
//! volatile the history is.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ExpenseForecast, MonthlyAggregate, Trend};
use crate::money::Money;

use super::advice::trend_factors;
use super::{
    MAX_CONFIDENCE, MIN_CONFIDENCE, MIN_HISTORY_MONTHS, STABLE_THRESHOLD_PERCENT,
    TREND_RECENT_MONTHS,
};

/// Forecast the month after the last entry in `history`.
///
/// The input does not need to be sorted. At least two months are required.
pub fn forecast_next_month(history: &[MonthlyAggregate]) -> Result<ExpenseForecast> {
    if history.len() < MIN_HISTORY_MONTHS {
        return Err(Error::InsufficientData {
            required: MIN_HISTORY_MONTHS,
            actual: history.len(),
        });
    }

    let mut sorted = history.to_vec();
    sorted.sort_by_key(|m| m.month);

    let expenses: Vec<f64> = sorted.iter().map(|m| m.expense.minor() as f64).collect();

    let weighted_avg = weighted_average(&expenses);
    let percent_change = recent_change(&expenses);
    let trend = classify(percent_change);
    let confidence = confidence(&expenses, weighted_avg);

    // Non-empty after the length check
    let month = sorted[sorted.len() - 1].month.next();
    let predicted_expense = Money::from_minor(weighted_avg.round() as i64).non_negative();

    debug!(
        "Forecast for {}: {} (trend {}, {:.1}%, confidence {})",
        month, predicted_expense, trend, percent_change, confidence
    );

    Ok(ExpenseForecast {
        month,
        predicted_expense,
        confidence,
        breakdown: Vec::new(),
        trend,
        percent_change,
        factors: trend_factors(trend, percent_change),
    })
}

/// Linear recency weights: the i-th month (1-indexed) has weight i
fn weighted_average(values: &[f64]) -> f64 {
    let (sum, weights) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, weights), (i, v)| {
            let w = (i + 1) as f64;
            (sum + v * w, weights + w)
        });
    if weights == 0.0 {
        0.0
    } else {
        sum / weights
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Percent change of the recent window's average over the older months.
///
/// With three months or fewer the recent window shrinks to leave at least
/// one older month to compare against.
fn recent_change(values: &[f64]) -> f64 {
    let n = values.len();
    let recent_len = if n <= TREND_RECENT_MONTHS {
        n.saturating_sub(1).max(1)
    } else {
        TREND_RECENT_MONTHS
    };
    let (older, recent) = values.split_at(n - recent_len);

    let avg_recent = mean(recent);
    let avg_older = if older.is_empty() {
        avg_recent
    } else {
        mean(older)
    };

    if avg_older == 0.0 {
        0.0
    } else {
        (avg_recent - avg_older) / avg_older * 100.0
    }
}

fn classify(percent_change: f64) -> Trend {
    if percent_change.abs() < STABLE_THRESHOLD_PERCENT {
        Trend::Stable
    } else if percent_change > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

/// 100 minus the coefficient of variation (as a percent), kept in 50-95
fn confidence(values: &[f64], weighted_avg: f64) -> u8 {
    let variance = values
        .iter()
        .map(|v| (v - weighted_avg).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    let stddev = variance.sqrt();
    let cv = if weighted_avg == 0.0 {
        0.0
    } else {
        stddev / weighted_avg
    };

    (100.0 - cv * 100.0)
        .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
        .round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::YearMonth;

    fn history(expenses: &[i64]) -> Vec<MonthlyAggregate> {
        let start = YearMonth::new(2024, 1).unwrap();
        expenses
            .iter()
            .enumerate()
            .map(|(i, e)| {
                MonthlyAggregate::new(
                    start.add_months(i as i32),
                    Money::from_minor(500_000),
                    Money::from_minor(*e),
                )
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history() {
        for len in 0..2 {
            let err = forecast_next_month(&history(&vec![100_000; len])).unwrap_err();
            assert!(matches!(
                err,
                Error::InsufficientData {
                    required: 2,
                    actual
                } if actual == len
            ));
        }
    }

    #[test]
    fn test_rising_expenses() {
        let forecast = forecast_next_month(&history(&[100_000, 110_000, 120_000])).unwrap();

        assert_eq!(forecast.month, YearMonth::new(2024, 4).unwrap());
        assert_eq!(forecast.trend, Trend::Increasing);
        // (100000*1 + 110000*2 + 120000*3) / 6
        assert_eq!(forecast.predicted_expense, Money::from_minor(113_333));
        assert!(forecast.predicted_expense > Money::from_minor(100_000));
        assert!(forecast.predicted_expense < Money::from_minor(120_000));
        assert!(forecast.confidence < 95);
        assert_eq!(forecast.confidence, 92);
    }

    #[test]
    fn test_identical_expenses_are_stable_and_confident() {
        let forecast = forecast_next_month(&history(&[80_000; 6])).unwrap();
        assert_eq!(forecast.trend, Trend::Stable);
        assert_eq!(forecast.confidence, 95);
        assert_eq!(forecast.predicted_expense, Money::from_minor(80_000));
        assert_eq!(forecast.percent_change, 0.0);
    }

    #[test]
    fn test_falling_expenses() {
        let forecast =
            forecast_next_month(&history(&[150_000, 150_000, 150_000, 100_000, 90_000, 80_000]))
                .unwrap();
        assert_eq!(forecast.trend, Trend::Decreasing);
        assert!(forecast.percent_change <= -20.0);
    }

    #[test]
    fn test_unsorted_input() {
        let mut h = history(&[100_000, 110_000, 120_000]);
        h.reverse();
        let forecast = forecast_next_month(&h).unwrap();
        assert_eq!(forecast.month, YearMonth::new(2024, 4).unwrap());
        assert_eq!(forecast.trend, Trend::Increasing);
    }

    #[test]
    fn test_year_rollover() {
        let h = vec![
            MonthlyAggregate::new(
                YearMonth::new(2023, 11).unwrap(),
                Money::zero(),
                Money::from_minor(1_000),
            ),
            MonthlyAggregate::new(
                YearMonth::new(2023, 12).unwrap(),
                Money::zero(),
                Money::from_minor(1_000),
            ),
        ];
        let forecast = forecast_next_month(&h).unwrap();
        assert_eq!(forecast.month, YearMonth::new(2024, 1).unwrap());
    }

    #[test]
    fn test_zero_expenses() {
        let forecast = forecast_next_month(&history(&[0, 0, 0])).unwrap();
        assert_eq!(forecast.predicted_expense, Money::zero());
        assert_eq!(forecast.trend, Trend::Stable);
        assert_eq!(forecast.confidence, 95);
    }

    #[test]
    fn test_bounds_hold_for_volatile_history() {
        let forecast =
            forecast_next_month(&history(&[10_000, 900_000, 5_000, 700_000, 0])).unwrap();
        assert!((50..=95).contains(&forecast.confidence));
        assert!(!forecast.predicted_expense.is_negative());
        assert_eq!(forecast.confidence, 50);
    }
}
