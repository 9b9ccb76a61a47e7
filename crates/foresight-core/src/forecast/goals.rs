//! Goal achievement projection
//!
//! Two entry points:
//! - `forecast_goal_achievement`: simplified projection from a flat monthly
//!   income/expense balance, with a feasibility tier
//! - `calculate_goal_forecast`: plan-based projection from actual
//!   contribution history, with a recommended contribution and three
//!   named scenarios
//!
//! Both take `as_of` explicitly so results are reproducible; the `_now`
//! wrappers use today's date.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::models::{
    ContributionRecord, Feasibility, GoalForecast, GoalProjection, GoalScenario, GoalScenarios,
    Plan, MONTHS_UNREACHABLE,
};
use crate::money::{add_months, months_until, Money, DEFAULT_CURRENCY_SYMBOL};

use super::advice::{feasibility_recommendations, goal_advice};
use super::{
    AGGRESSIVE_MULTIPLIER, CHALLENGING_SAVINGS_RATE, CONSERVATIVE_MULTIPLIER,
    CONTRIBUTION_WINDOW_MONTHS, CURRENT_MULTIPLIER, EASY_SAVINGS_RATE, MODERATE_SAVINGS_RATE,
};

/// Project how long it takes to reach `goal_amount` saving the monthly
/// difference between income and expense.
pub fn forecast_goal_achievement(
    current_savings: Money,
    goal_amount: Money,
    monthly_income: Money,
    monthly_expense: Money,
    as_of: NaiveDate,
) -> GoalProjection {
    let monthly_balance = monthly_income - monthly_expense;
    let remaining_amount = (goal_amount - current_savings).non_negative();
    let savings_rate = if monthly_income.is_positive() {
        monthly_balance.ratio(monthly_income) * 100.0
    } else {
        0.0
    };

    let (months_to_goal, feasibility) = match remaining_amount.ceil_div(monthly_balance) {
        Some(months) => (clamp_months(months), feasibility_for(savings_rate)),
        None => (MONTHS_UNREACHABLE, Feasibility::Unrealistic),
    };

    let estimated_completion_date =
        (months_to_goal != MONTHS_UNREACHABLE).then(|| add_months(as_of, months_to_goal as i32));

    debug!(
        "Goal projection: {} remaining at {}/month -> {} months ({})",
        remaining_amount, monthly_balance, months_to_goal, feasibility
    );

    GoalProjection {
        current_savings,
        goal_amount,
        remaining_amount,
        monthly_balance,
        savings_rate,
        months_to_goal,
        estimated_completion_date,
        feasibility,
        recommendations: feasibility_recommendations(feasibility, monthly_balance, savings_rate),
    }
}

/// `forecast_goal_achievement` as of today
pub fn forecast_goal_achievement_now(
    current_savings: Money,
    goal_amount: Money,
    monthly_income: Money,
    monthly_expense: Money,
) -> GoalProjection {
    forecast_goal_achievement(
        current_savings,
        goal_amount,
        monthly_income,
        monthly_expense,
        Utc::now().date_naive(),
    )
}

/// Project a stored plan from its recent contribution history
pub fn calculate_goal_forecast(
    plan: &Plan,
    contributions: &[ContributionRecord],
    as_of: NaiveDate,
) -> GoalForecast {
    let average = average_contribution(plan, contributions, as_of);
    let remaining_amount = (plan.goal_amount - plan.current_amount).non_negative();

    let progress_percentage = if plan.goal_amount.is_positive() {
        (plan.current_amount.ratio(plan.goal_amount) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let months_to_goal = remaining_amount
        .ceil_div(average)
        .map(clamp_months)
        .filter(|m| *m != MONTHS_UNREACHABLE);
    let estimated_completion_date = months_to_goal.map(|m| add_months(as_of, m as i32));

    let months_until_target = plan.target_date.map(|target| months_until(as_of, target));
    let recommended_monthly_contribution = match months_until_target {
        Some(months) if remaining_amount.is_positive() => remaining_amount.div_ceil_by(months),
        _ => average,
    };

    let scenarios = GoalScenarios {
        conservative: scenario_at(remaining_amount, average.scale(CONSERVATIVE_MULTIPLIER), as_of),
        current: scenario_at(remaining_amount, average.scale(CURRENT_MULTIPLIER), as_of),
        aggressive: scenario_at(remaining_amount, average.scale(AGGRESSIVE_MULTIPLIER), as_of),
    };

    let mut forecast = GoalForecast {
        plan_id: plan.id,
        plan_name: plan.name.clone(),
        goal_amount: plan.goal_amount,
        current_amount: plan.current_amount,
        remaining_amount,
        progress_percentage,
        current_monthly_contribution: plan.monthly_contribution,
        average_monthly_contribution: average,
        months_to_goal,
        estimated_completion_date,
        months_until_target,
        recommended_monthly_contribution,
        scenarios,
        advice: String::new(),
    };
    forecast.advice = goal_advice(&forecast, DEFAULT_CURRENCY_SYMBOL);

    debug!(
        "Goal forecast for plan {}: avg {}/month, {:?} months, recommended {}",
        plan.id, average, months_to_goal, recommended_monthly_contribution
    );

    forecast
}

/// `calculate_goal_forecast` as of today
pub fn calculate_goal_forecast_now(
    plan: &Plan,
    contributions: &[ContributionRecord],
) -> GoalForecast {
    calculate_goal_forecast(plan, contributions, Utc::now().date_naive())
}

/// Average monthly contribution over the trailing window.
///
/// The sum is divided by the window length, not the number of months that
/// had contributions. Falls back to the plan's configured contribution when
/// the window is empty.
fn average_contribution(
    plan: &Plan,
    contributions: &[ContributionRecord],
    as_of: NaiveDate,
) -> Money {
    let window_start = add_months(as_of, -(CONTRIBUTION_WINDOW_MONTHS as i32));

    let in_window: Vec<Money> = contributions
        .iter()
        .filter(|c| {
            let day = c.occurred_at.date_naive();
            day > window_start && day <= as_of
        })
        .map(|c| c.amount)
        .collect();

    if in_window.is_empty() {
        return plan.monthly_contribution;
    }

    let total: Money = in_window.into_iter().sum();
    total.scale(1.0 / CONTRIBUTION_WINDOW_MONTHS as f64)
}

fn scenario_at(remaining: Money, monthly_amount: Money, as_of: NaiveDate) -> GoalScenario {
    match remaining.ceil_div(monthly_amount) {
        Some(months) => {
            let months = clamp_months(months);
            GoalScenario {
                monthly_amount,
                months_to_goal: months,
                completion_date: (months != MONTHS_UNREACHABLE)
                    .then(|| add_months(as_of, months as i32)),
            }
        }
        None => GoalScenario {
            monthly_amount,
            months_to_goal: MONTHS_UNREACHABLE,
            completion_date: None,
        },
    }
}

fn feasibility_for(savings_rate: f64) -> Feasibility {
    if savings_rate >= EASY_SAVINGS_RATE {
        Feasibility::Easy
    } else if savings_rate >= MODERATE_SAVINGS_RATE {
        Feasibility::Moderate
    } else if savings_rate >= CHALLENGING_SAVINGS_RATE {
        Feasibility::Challenging
    } else {
        Feasibility::Unrealistic
    }
}

/// Anything at or past the sentinel is treated as never
fn clamp_months(months: i64) -> u32 {
    months.clamp(0, MONTHS_UNREACHABLE as i64) as u32
}
