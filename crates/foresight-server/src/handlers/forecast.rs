//! Expense forecast and health handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, MAX_HISTORY_MONTHS};
use foresight_core::{ForecastReport, MonthlyAggregate};

/// Response for the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a narrative backend is configured
    pub narrative: bool,
}

/// GET /api/health - Liveness check
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        narrative: state.service.has_narrator(),
    })
}

/// Request body for forecasting from supplied history
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub history: Vec<MonthlyAggregate>,
    #[serde(default)]
    pub narrate: bool,
}

/// Query parameters for forecasting from stored transactions
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Completed months of history to use (default from engine config)
    pub months: Option<u32>,
    #[serde(default)]
    pub narrate: bool,
}

/// POST /api/forecast/expenses - Forecast next month from the given history
pub async fn expense_forecast(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForecastRequest>,
) -> Result<Json<ForecastReport>, AppError> {
    for month in &req.history {
        month.income.check_input("income")?;
        month.expense.check_input("expense")?;
    }

    let report = state
        .service
        .forecast_from_history(&req.history, req.narrate)
        .await?;
    Ok(Json(report))
}

/// GET /api/forecast/expenses - Forecast next month from stored transactions
pub async fn stored_expense_forecast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<ForecastReport>, AppError> {
    let months = params
        .months
        .unwrap_or(state.service.config().history_months);
    if months == 0 || months > MAX_HISTORY_MONTHS {
        return Err(AppError::bad_request(&format!(
            "months must be between 1 and {}",
            MAX_HISTORY_MONTHS
        )));
    }

    let report = state
        .service
        .expense_forecast(&state.db, months, params.narrate)
        .await?;
    Ok(Json(report))
}
