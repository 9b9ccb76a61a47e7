//! Rule-based advice text
//!
//! Every function here reads numbers that were already computed by the
//! engines and picks a message from an ordered rule list. Only the first
//! matching rule fires. Nothing here re-derives a number, so the text can be
//! reworded without touching any numeric result.

use crate::models::{Affects, Feasibility, GoalForecast, Trend, MONTHS_UNREACHABLE};
use crate::money::Money;

use super::{PLANNING_HORIZON_MONTHS, SHARP_CHANGE_PERCENT};

/// Render a month count for people, hiding the "never" sentinel
pub fn describe_months(months: Option<u32>) -> String {
    match months {
        None | Some(MONTHS_UNREACHABLE) => "not achievable at the current pace".to_string(),
        Some(0) => "already reached".to_string(),
        Some(1) => "1 month".to_string(),
        Some(m) if m < 24 => format!("{} months", m),
        Some(m) => {
            let years = m / 12;
            match m % 12 {
                0 => format!("{} years", years),
                1 => format!("{} years 1 month", years),
                rest => format!("{} years {} months", years, rest),
            }
        }
    }
}

/// Explanatory factors for an expense forecast
pub fn trend_factors(trend: Trend, percent_change: f64) -> Vec<String> {
    let magnitude = percent_change.abs();
    let sharp = magnitude >= SHARP_CHANGE_PERCENT;

    match trend {
        Trend::Increasing if sharp => vec![
            format!(
                "Spending rose sharply ({:.1}%) over the last few months",
                magnitude
            ),
            "Significant increase: review recent large or new expenses".to_string(),
        ],
        Trend::Increasing => vec![
            format!(
                "Spending is trending upward ({:.1}%) compared to earlier months",
                magnitude
            ),
            "Recent months are weighted most heavily in this prediction".to_string(),
        ],
        Trend::Decreasing if sharp => vec![
            format!(
                "Spending dropped sharply ({:.1}%) over the last few months",
                magnitude
            ),
            "Significant decrease: check whether it reflects a lasting change".to_string(),
        ],
        Trend::Decreasing => vec![
            format!(
                "Spending is trending downward ({:.1}%) compared to earlier months",
                magnitude
            ),
            "Recent months are weighted most heavily in this prediction".to_string(),
        ],
        Trend::Stable => vec![
            "Spending has been consistent month to month".to_string(),
            "Prediction follows your recent average".to_string(),
        ],
    }
}

/// Advice line for a plan-based goal forecast, with amounts shown using
/// `symbol`.
///
/// Expects every numeric field of `forecast` to be filled in already.
pub fn goal_advice(forecast: &GoalForecast, symbol: &str) -> String {
    let fmt = |m: Money| m.format_with_symbol(symbol);
    let average = forecast.average_monthly_contribution;

    if forecast.progress_percentage >= 90.0 {
        return format!(
            "Almost there! You're {:.0}% of the way to {}, only {} to go.",
            forecast.progress_percentage,
            forecast.plan_name,
            fmt(forecast.remaining_amount)
        );
    }

    if let Some(target_months) = forecast.months_until_target {
        let misses_target = match forecast.months_to_goal {
            Some(months) => months > target_months,
            None => true,
        };
        if forecast.remaining_amount.is_positive() && misses_target {
            let shortfall = (forecast.recommended_monthly_contribution - average).non_negative();
            return format!(
                "To reach your goal by the target date, increase your monthly contribution by {} (to {}).",
                fmt(shortfall),
                fmt(forecast.recommended_monthly_contribution)
            );
        }
    }

    if average.is_zero() {
        let suggested = forecast
            .remaining_amount
            .div_ceil_by(PLANNING_HORIZON_MONTHS);
        return format!(
            "Start contributing to reach your goal. We recommend {}/month to get there within a year.",
            fmt(suggested)
        );
    }

    match forecast.months_to_goal {
        Some(months) if months <= 12 => format!(
            "Great pace! At {}/month you'll reach your goal in {}.",
            fmt(average),
            describe_months(Some(months))
        ),
        Some(months) if months > 24 => format!(
            "At the current pace this goal takes {}. Increasing contributions by 50% to {}/month would cut it to {}.",
            describe_months(Some(months)),
            fmt(forecast.scenarios.aggressive.monthly_amount),
            describe_months(Some(forecast.scenarios.aggressive.months_to_goal))
        ),
        _ => format!(
            "Keep it up! Steady contributions of {}/month will get you there in {}.",
            fmt(average),
            describe_months(forecast.months_to_goal)
        ),
    }
}

/// Recommendations for a simplified goal projection
pub fn feasibility_recommendations(
    feasibility: Feasibility,
    monthly_balance: Money,
    savings_rate: f64,
) -> Vec<String> {
    if !monthly_balance.is_positive() {
        return vec![
            "Your expenses meet or exceed your income, so this goal cannot be reached yet"
                .to_string(),
            "Reduce monthly spending to free up money for saving".to_string(),
            "Look for ways to increase your monthly income".to_string(),
        ];
    }

    match feasibility {
        Feasibility::Easy => vec![
            format!(
                "You're saving {:.0}% of your income, which puts this goal well within reach",
                savings_rate
            ),
            "Consider a more ambitious goal or investing the surplus".to_string(),
        ],
        Feasibility::Moderate => vec![
            format!("A {:.0}% savings rate keeps this goal on track", savings_rate),
            "Automate a monthly transfer so the plan stays consistent".to_string(),
        ],
        Feasibility::Challenging => vec![
            format!(
                "A {:.0}% savings rate makes this goal a stretch",
                savings_rate
            ),
            "Review discretionary categories for savings".to_string(),
            "Consider extending your timeline".to_string(),
        ],
        Feasibility::Unrealistic => vec![
            format!(
                "Saving {:.1}% of your income is too little to reach this goal in a reasonable time",
                savings_rate
            ),
            "Cut non-essential spending to raise your savings rate".to_string(),
            "Consider a smaller goal or a longer timeline".to_string(),
        ],
    }
}

/// Recommendation text for a what-if scenario.
///
/// Cites the monthly impact and the annualized impact (12 x monthly).
pub fn scenario_recommendation(affects: Affects, monthly_change: Money, symbol: &str) -> String {
    if monthly_change.is_zero() {
        return "This scenario doesn't change your monthly balance.".to_string();
    }

    let monthly = monthly_change.abs().format_with_symbol(symbol);
    let yearly = (monthly_change.abs() * 12).format_with_symbol(symbol);

    match (affects, monthly_change.is_positive()) {
        (Affects::Income, true) => format!(
            "This income increase improves your balance by {}/month, or {} over a year. Consider saving the extra.",
            monthly, yearly
        ),
        (Affects::Income, false) => format!(
            "This income drop reduces your balance by {}/month, or {} over a year. Plan spending cuts to cover it.",
            monthly, yearly
        ),
        (Affects::Expense, true) => format!(
            "This added expense costs {}/month, or {} over a year. Make sure it fits your budget.",
            monthly, yearly
        ),
        (Affects::Expense, false) => format!(
            "Cutting this expense saves {}/month, or {} over a year. A worthwhile change.",
            monthly, yearly
        ),
    }
}
