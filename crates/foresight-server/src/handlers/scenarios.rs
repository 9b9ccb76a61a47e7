//! What-if scenario handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{AppError, AppState, MAX_SIMULATION_MONTHS};
use foresight_core::{Money, ScenarioResult, WhatIfScenario, YearMonth};

/// Request body for a simulation
///
/// Missing baseline figures are filled in from stored history.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub scenario: WhatIfScenario,
    pub monthly_income: Option<Money>,
    pub monthly_expense: Option<Money>,
    pub months: Option<u32>,
}

/// POST /api/scenarios/simulate - Simulate a recurring change
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<ScenarioResult>, AppError> {
    if req.scenario.name.trim().is_empty() {
        return Err(AppError::bad_request("Scenario name is required"));
    }
    req.scenario.monthly_change.check_input("monthly_change")?;
    if let Some(income) = req.monthly_income {
        income.check_input("monthly_income")?;
    }
    if let Some(expense) = req.monthly_expense {
        expense.check_input("monthly_expense")?;
    }
    if let Some(months) = req.months {
        if months > MAX_SIMULATION_MONTHS {
            return Err(AppError::bad_request(&format!(
                "months must be at most {}",
                MAX_SIMULATION_MONTHS
            )));
        }
    }

    let current = YearMonth::current();
    let baseline = match (req.monthly_income, req.monthly_expense) {
        (Some(income), Some(expense)) => Some((income, expense)),
        (None, None) => None,
        (income, expense) => {
            let (stored_income, stored_expense) =
                state.service.trailing_baseline(&state.db, current)?;
            Some((
                income.unwrap_or(stored_income),
                expense.unwrap_or(stored_expense),
            ))
        }
    };

    let result = state
        .service
        .simulate_at(&state.db, &req.scenario, req.months, baseline, current)
        .await?;
    Ok(Json(result))
}
