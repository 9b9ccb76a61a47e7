//! Forecast service
//!
//! Composes the pure engines with the stores: fetch history or plans, run the
//! engine, attach advice, and optionally add a narrative. Store failures
//! propagate; narrative failures never do.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::NarrativeBackend;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::{ExpenseForecast, GoalForecast, MonthlyAggregate, ScenarioResult, WhatIfScenario};
use crate::money::{add_months, Money, YearMonth};
use crate::store::{HistoryProvider, PlanStore};

use super::advice::{describe_months, goal_advice, scenario_recommendation};
use super::goals::calculate_goal_forecast;
use super::narrative::{NarrativePrompt, Narrator};
use super::scenario::simulate_scenario;
use super::trend::forecast_next_month;
use super::{BASELINE_MONTHS, CONTRIBUTION_WINDOW_MONTHS, NARRATIVE_FALLBACK};

/// Expense forecast plus optional narrative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    #[serde(flatten)]
    pub forecast: ExpenseForecast,
    /// Average monthly income over the same history
    pub monthly_income: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Goal forecast plus optional narrative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalReport {
    #[serde(flatten)]
    pub forecast: GoalForecast,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Runs the engines against stored data
#[derive(Clone, Default)]
pub struct ForecastService {
    narrator: Option<Narrator>,
    config: EngineConfig,
}

impl ForecastService {
    /// Service without narrative enrichment
    pub fn new(config: EngineConfig) -> Self {
        Self {
            narrator: None,
            config,
        }
    }

    /// Attach a narrator for enrichment
    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Use the AI backend from the environment when narration is enabled
    pub fn from_env(config: EngineConfig) -> Self {
        let narrator = if config.narrative_enabled {
            Narrator::from_env(config.narrative_timeout)
        } else {
            None
        };
        if let Some(ref n) = narrator {
            info!(
                "Narrative enrichment via {} ({})",
                n.client().backend_name(),
                n.client().host()
            );
        }
        Self { narrator, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_narrator(&self) -> bool {
        self.narrator.is_some()
    }

    /// Forecast next month from the last `months` completed months
    pub async fn expense_forecast(
        &self,
        history: &dyn HistoryProvider,
        months: u32,
        narrate: bool,
    ) -> Result<ForecastReport> {
        self.expense_forecast_at(history, YearMonth::current(), months, narrate)
            .await
    }

    /// `expense_forecast` with an explicit current month. The current month
    /// is treated as incomplete and left out.
    pub async fn expense_forecast_at(
        &self,
        history: &dyn HistoryProvider,
        current: YearMonth,
        months: u32,
        narrate: bool,
    ) -> Result<ForecastReport> {
        let to = current.prev();
        let from = to.add_months(-(months.max(1) as i32 - 1));

        let aggregates = history.monthly_aggregates(from, to)?;
        debug!("Loaded {} months of history ({}..={})", aggregates.len(), from, to);

        let breakdown = history.category_breakdown(from, to)?;
        let mut report = self.forecast_from_history(&aggregates, narrate).await?;
        report.forecast = report.forecast.with_breakdown(breakdown);
        Ok(report)
    }

    /// Forecast from history supplied by the caller
    pub async fn forecast_from_history(
        &self,
        aggregates: &[MonthlyAggregate],
        narrate: bool,
    ) -> Result<ForecastReport> {
        let forecast = forecast_next_month(aggregates)?;
        let monthly_income = average(aggregates.iter().map(|m| m.income));

        let narrative = if narrate {
            let prompt = NarrativePrompt {
                predicted_expense: forecast.predicted_expense,
                confidence: forecast.confidence,
                trend: forecast.trend,
                monthly_income,
                goal: None,
                currency_symbol: self.config.currency_symbol.clone(),
            };
            Some(self.narrate(&prompt.render()).await)
        } else {
            None
        };

        Ok(ForecastReport {
            forecast,
            monthly_income,
            narrative,
        })
    }

    /// Project a stored plan as of `as_of`
    pub async fn goal_report(
        &self,
        plans: &dyn PlanStore,
        plan_id: i64,
        as_of: NaiveDate,
        narrate: bool,
    ) -> Result<GoalReport> {
        let plan = plans
            .get_plan(plan_id)?
            .ok_or_else(|| Error::NotFound(format!("Plan {}", plan_id)))?;

        let since = add_months(as_of, -(CONTRIBUTION_WINDOW_MONTHS as i32))
            .and_time(NaiveTime::MIN)
            .and_utc();
        let contributions = plans.contributions_since(plan_id, since)?;

        let mut forecast = calculate_goal_forecast(&plan, &contributions, as_of);
        forecast.advice = goal_advice(&forecast, &self.config.currency_symbol);

        let narrative = if narrate {
            let prompt = goal_prompt(&forecast, &self.config.currency_symbol);
            Some(self.narrate(&prompt).await)
        } else {
            None
        };

        Ok(GoalReport {
            forecast,
            narrative,
        })
    }

    /// Simulate a scenario starting from the current month
    pub async fn simulate(
        &self,
        history: &dyn HistoryProvider,
        scenario: &WhatIfScenario,
        months: Option<u32>,
        baseline: Option<(Money, Money)>,
    ) -> Result<ScenarioResult> {
        self.simulate_at(history, scenario, months, baseline, YearMonth::current())
            .await
    }

    /// `simulate` with an explicit current month.
    ///
    /// Without an explicit baseline, income and expense are the averages of
    /// the last completed months.
    pub async fn simulate_at(
        &self,
        history: &dyn HistoryProvider,
        scenario: &WhatIfScenario,
        months: Option<u32>,
        baseline: Option<(Money, Money)>,
        current: YearMonth,
    ) -> Result<ScenarioResult> {
        let (income, expense) = match baseline {
            Some(b) => b,
            None => self.trailing_baseline(history, current)?,
        };
        let months = months.unwrap_or(self.config.simulation_months);

        let mut result = simulate_scenario(scenario, income, expense, months, current);
        result.recommendation = scenario_recommendation(
            scenario.affects,
            scenario.monthly_change,
            &self.config.currency_symbol,
        );
        Ok(result)
    }

    /// Average income and expense over the trailing baseline window
    pub fn trailing_baseline(
        &self,
        history: &dyn HistoryProvider,
        current: YearMonth,
    ) -> Result<(Money, Money)> {
        let to = current.prev();
        let from = to.add_months(-(BASELINE_MONTHS as i32 - 1));
        let aggregates = history.monthly_aggregates(from, to)?;
        if aggregates.is_empty() {
            return Err(Error::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        Ok((
            average(aggregates.iter().map(|m| m.income)),
            average(aggregates.iter().map(|m| m.expense)),
        ))
    }

    async fn narrate(&self, prompt: &str) -> String {
        match &self.narrator {
            Some(narrator) => narrator.narrate_text(prompt).await,
            None => {
                debug!("Narrative requested but no backend is configured");
                NARRATIVE_FALLBACK.to_string()
            }
        }
    }
}

fn average(amounts: impl Iterator<Item = Money>) -> Money {
    let (total, count) = amounts.fold((Money::zero(), 0u32), |(t, c), m| (t + m, c + 1));
    if count == 0 {
        Money::zero()
    } else {
        total.scale(1.0 / count as f64)
    }
}

fn goal_prompt(forecast: &GoalForecast, symbol: &str) -> String {
    let fmt = |m: Money| m.format_with_symbol(symbol);
    format!(
        "You are a concise personal finance assistant. Using only the figures below, \
         write 2-3 short sentences of encouragement and practical advice. Do not invent numbers.\n\n\
         Goal: {} ({})\n\
         Saved so far: {} ({:.0}%)\n\
         Average monthly contribution: {}\n\
         Time to goal: {}\n\
         Recommended monthly contribution: {}\n",
        forecast.plan_name,
        fmt(forecast.goal_amount),
        fmt(forecast.current_amount),
        forecast.progress_percentage,
        fmt(forecast.average_monthly_contribution),
        describe_months(forecast.months_to_goal),
        fmt(forecast.recommended_monthly_contribution),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIClient, MockBackend};
    use crate::models::{Affects, NewPlan, PlanType, Trend};
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn store() -> InMemoryStore {
        let store = InMemoryStore::with_history(vec![
            MonthlyAggregate::new(ym(2024, 1), Money::from_minor(400_000), Money::from_minor(100_000)),
            MonthlyAggregate::new(ym(2024, 2), Money::from_minor(400_000), Money::from_minor(110_000)),
            MonthlyAggregate::new(ym(2024, 3), Money::from_minor(400_000), Money::from_minor(120_000)),
            // Current month, incomplete
            MonthlyAggregate::new(ym(2024, 4), Money::zero(), Money::from_minor(5_000)),
        ]);
        store
            .push_category(ym(2024, 3), "Groceries", Money::from_minor(40_000))
            .unwrap();
        store
    }

    fn narrated(reply: &str) -> ForecastService {
        ForecastService::new(EngineConfig::default()).with_narrator(Narrator::new(
            AIClient::Mock(MockBackend::with_reply(reply)),
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_expense_forecast_excludes_current_month() {
        let service = ForecastService::new(EngineConfig::default());
        let report = service
            .expense_forecast_at(&store(), ym(2024, 4), 6, false)
            .await
            .unwrap();

        assert_eq!(report.forecast.month, ym(2024, 4));
        assert_eq!(report.forecast.trend, Trend::Increasing);
        assert_eq!(report.forecast.breakdown.len(), 1);
        assert_eq!(report.monthly_income, Money::from_minor(400_000));
        assert!(report.narrative.is_none());
    }

    #[tokio::test]
    async fn test_expense_forecast_insufficient_history() {
        let service = ForecastService::new(EngineConfig::default());
        let err = service
            .expense_forecast_at(&store(), ym(2024, 2), 6, false)
            .await
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[tokio::test]
    async fn test_narrative_attached_when_requested() {
        let report = narrated("Spending is rising.")
            .expense_forecast_at(&store(), ym(2024, 4), 6, true)
            .await
            .unwrap();
        assert_eq!(report.narrative.as_deref(), Some("Spending is rising."));
    }

    #[tokio::test]
    async fn test_narrative_fallback_without_backend() {
        let service = ForecastService::new(EngineConfig::default());
        let report = service
            .expense_forecast_at(&store(), ym(2024, 4), 6, true)
            .await
            .unwrap();
        assert_eq!(report.narrative.as_deref(), Some(NARRATIVE_FALLBACK));
    }

    #[tokio::test]
    async fn test_goal_report() {
        let store = InMemoryStore::new();
        let id = store
            .create_plan(&NewPlan {
                name: "Laptop".to_string(),
                goal_amount: Money::from_minor(200_000),
                current_amount: Money::zero(),
                monthly_contribution: Money::from_minor(10_000),
                target_date: None,
                plan_type: PlanType::Purchase,
            })
            .unwrap();
        for month in [4, 5, 6] {
            store
                .record_contribution(
                    id,
                    Money::from_minor(50_000),
                    Utc.with_ymd_and_hms(2024, month, 10, 9, 0, 0).unwrap(),
                )
                .unwrap();
        }

        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let report = narrated("Nice work.")
            .goal_report(&store, id, as_of, true)
            .await
            .unwrap();

        assert_eq!(report.forecast.current_amount, Money::from_minor(150_000));
        assert_eq!(report.forecast.average_monthly_contribution, Money::from_minor(50_000));
        assert_eq!(report.forecast.months_to_goal, Some(1));
        assert_eq!(report.narrative.as_deref(), Some("Nice work."));
    }

    #[tokio::test]
    async fn test_goal_report_missing_plan() {
        let service = ForecastService::new(EngineConfig::default());
        let err = service
            .goal_report(&InMemoryStore::new(), 99, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_simulate_uses_trailing_baseline() {
        let service = ForecastService::new(EngineConfig::default());
        let scenario = WhatIfScenario {
            name: "Raise".to_string(),
            description: String::new(),
            monthly_change: Money::from_minor(20_000),
            affects: Affects::Income,
            category: None,
        };

        let result = service
            .simulate_at(&store(), &scenario, None, None, ym(2024, 4))
            .await
            .unwrap();

        // income 400000, expense avg 110000
        assert_eq!(result.original_balance, Money::from_minor(290_000));
        assert_eq!(result.new_balance, Money::from_minor(310_000));
        assert_eq!(result.timeline.len(), 12);

        let explicit = service
            .simulate_at(
                &store(),
                &scenario,
                Some(3),
                Some((Money::from_minor(100), Money::from_minor(50))),
                ym(2024, 4),
            )
            .await
            .unwrap();
        assert_eq!(explicit.original_balance, Money::from_minor(50));
        assert_eq!(explicit.timeline.len(), 3);
    }

    #[tokio::test]
    async fn test_configured_currency_symbol_in_text() {
        let config = EngineConfig {
            currency_symbol: "€".to_string(),
            ..EngineConfig::default()
        };
        let service = ForecastService::new(config);

        let scenario = WhatIfScenario {
            name: "Streaming".to_string(),
            description: String::new(),
            monthly_change: Money::from_minor(1_500),
            affects: Affects::Expense,
            category: None,
        };
        let result = service
            .simulate_at(&store(), &scenario, Some(3), None, ym(2024, 4))
            .await
            .unwrap();
        assert!(result.recommendation.contains("€15.00/month"));
        assert!(!result.recommendation.contains('$'));

        let plans = InMemoryStore::new();
        let id = plans
            .create_plan(&NewPlan {
                name: "Bike".to_string(),
                goal_amount: Money::from_minor(120_000),
                current_amount: Money::zero(),
                monthly_contribution: Money::zero(),
                target_date: None,
                plan_type: PlanType::Purchase,
            })
            .unwrap();
        let report = service
            .goal_report(&plans, id, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(), false)
            .await
            .unwrap();
        assert!(report.forecast.advice.contains("€100.00/month"));
        assert!(!report.forecast.advice.contains('$'));
    }

    #[tokio::test]
    async fn test_simulate_without_history() {
        let service = ForecastService::new(EngineConfig::default());
        let scenario = WhatIfScenario {
            name: "Cut".to_string(),
            description: String::new(),
            monthly_change: Money::from_minor(-1_000),
            affects: Affects::Expense,
            category: None,
        };
        let err = service
            .simulate_at(&InMemoryStore::new(), &scenario, None, None, ym(2024, 4))
            .await
            .unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
