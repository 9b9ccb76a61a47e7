//! What-if scenario simulation
//!
//! Applies a recurring monthly change to income or expense and projects the
//! cumulative balance against the unchanged baseline.

use tracing::debug;

use crate::models::{Affects, ScenarioResult, TimelinePoint, WhatIfScenario};
use crate::money::{Money, YearMonth, DEFAULT_CURRENCY_SYMBOL};

use super::advice::scenario_recommendation;

/// Simulate `scenario` for `months` months after `start`.
///
/// Timeline balances are cumulative; the first point is labelled with the
/// month after `start`.
pub fn simulate_scenario(
    scenario: &WhatIfScenario,
    monthly_income: Money,
    monthly_expense: Money,
    months: u32,
    start: YearMonth,
) -> ScenarioResult {
    let original_balance = monthly_income - monthly_expense;

    let (new_income, new_expense) = match scenario.affects {
        Affects::Income => (monthly_income + scenario.monthly_change, monthly_expense),
        Affects::Expense => (monthly_income, monthly_expense + scenario.monthly_change),
    };
    let new_balance = new_income - new_expense;
    let difference = new_balance - original_balance;

    let impact_percentage = if original_balance.is_zero() {
        0.0
    } else {
        difference.ratio(original_balance.abs()) * 100.0
    };

    let timeline = (1..=months)
        .map(|i| TimelinePoint {
            month: start.add_months(i as i32),
            original: original_balance * i as i64,
            new: new_balance * i as i64,
        })
        .collect();

    debug!(
        "Scenario '{}': balance {} -> {} ({:+.1}%) over {} months",
        scenario.name, original_balance, new_balance, impact_percentage, months
    );

    ScenarioResult {
        scenario: scenario.clone(),
        original_balance,
        new_balance,
        difference,
        impact_percentage,
        recommendation: scenario_recommendation(
            scenario.affects,
            scenario.monthly_change,
            DEFAULT_CURRENCY_SYMBOL,
        ),
        timeline,
    }
}

/// `simulate_scenario` starting from the current month
pub fn simulate_scenario_from_now(
    scenario: &WhatIfScenario,
    monthly_income: Money,
    monthly_expense: Money,
    months: u32,
) -> ScenarioResult {
    simulate_scenario(
        scenario,
        monthly_income,
        monthly_expense,
        months,
        YearMonth::current(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::DEFAULT_SIMULATION_MONTHS;

    fn scenario(change: i64, affects: Affects) -> WhatIfScenario {
        WhatIfScenario {
            name: "Gym membership".to_string(),
            description: String::new(),
            monthly_change: Money::from_minor(change),
            affects,
            category: Some("Health".to_string()),
        }
    }

    fn start() -> YearMonth {
        YearMonth::new(2024, 1).unwrap()
    }

    #[test]
    fn test_expense_increase() {
        let result = simulate_scenario(
            &scenario(5_000, Affects::Expense),
            Money::from_minor(400_000),
            Money::from_minor(300_000),
            DEFAULT_SIMULATION_MONTHS,
            start(),
        );

        assert_eq!(result.original_balance, Money::from_minor(100_000));
        assert_eq!(result.new_balance, Money::from_minor(95_000));
        assert_eq!(result.difference, Money::from_minor(-5_000));
        assert_eq!(result.impact_percentage, -5.0);
        assert!(result.recommendation.contains("$50.00/month"));
        assert!(result.recommendation.contains("$600.00 over a year"));
    }

    #[test]
    fn test_income_change_doubles() {
        let base = |change| {
            simulate_scenario(
                &scenario(change, Affects::Income),
                Money::from_minor(400_000),
                Money::from_minor(300_000),
                6,
                start(),
            )
            .difference
        };
        assert_eq!(base(20_000) * 2, base(40_000));
        assert_eq!(base(-7_500) * 2, base(-15_000));
    }

    #[test]
    fn test_extreme_amounts_do_not_panic() {
        let result = simulate_scenario(
            &scenario(1, Affects::Income),
            Money::from_minor(i64::MAX / 4),
            Money::zero(),
            12,
            start(),
        );

        assert_eq!(result.timeline.len(), 12);
        assert_eq!(result.timeline[11].original, Money::from_minor(i64::MAX));

        let result = simulate_scenario(
            &scenario(i64::MIN, Affects::Expense),
            Money::zero(),
            Money::from_minor(i64::MAX),
            3,
            start(),
        );
        assert_eq!(result.original_balance, Money::from_minor(-i64::MAX));
        assert!(!result.recommendation.is_empty());
    }

    #[test]
    fn test_zero_original_balance_has_zero_impact() {
        let result = simulate_scenario(
            &scenario(10_000, Affects::Income),
            Money::from_minor(250_000),
            Money::from_minor(250_000),
            3,
            start(),
        );
        assert_eq!(result.impact_percentage, 0.0);
        assert_eq!(result.new_balance, Money::from_minor(10_000));
    }

    #[test]
    fn test_negative_original_uses_magnitude() {
        let result = simulate_scenario(
            &scenario(-10_000, Affects::Expense),
            Money::from_minor(100_000),
            Money::from_minor(150_000),
            3,
            start(),
        );
        // Improvement of 10000 on a -50000 baseline is +20%
        assert_eq!(result.impact_percentage, 20.0);
    }

    #[test]
    fn test_timeline_is_cumulative() {
        let result = simulate_scenario(
            &scenario(10_000, Affects::Income),
            Money::from_minor(200_000),
            Money::from_minor(150_000),
            12,
            YearMonth::new(2024, 6).unwrap(),
        );

        assert_eq!(result.timeline.len(), 12);
        let first = &result.timeline[0];
        assert_eq!(first.month, YearMonth::new(2024, 7).unwrap());
        assert_eq!(first.original, Money::from_minor(50_000));
        assert_eq!(first.new, Money::from_minor(60_000));

        let last = &result.timeline[11];
        assert_eq!(last.month, YearMonth::new(2025, 6).unwrap());
        assert_eq!(last.original, Money::from_minor(600_000));
        assert_eq!(last.new, Money::from_minor(720_000));
    }

    #[test]
    fn test_zero_months_has_empty_timeline() {
        let result = simulate_scenario(
            &scenario(0, Affects::Expense),
            Money::from_minor(1),
            Money::zero(),
            0,
            start(),
        );
        assert!(result.timeline.is_empty());
        assert_eq!(result.difference, Money::zero());
        assert!(result.recommendation.contains("doesn't change"));
    }
}
