//! Goal projection handlers

use axum::Json;
use serde::Deserialize;

use crate::AppError;
use foresight_core::forecast::forecast_goal_achievement_now;
use foresight_core::{GoalProjection, Money};

/// Request body for a simplified goal projection
#[derive(Debug, Deserialize)]
pub struct GoalProjectionRequest {
    #[serde(default)]
    pub current_savings: Money,
    pub goal_amount: Money,
    pub monthly_income: Money,
    pub monthly_expense: Money,
}

/// POST /api/goals/projection - Project time to a savings goal
pub async fn goal_projection(
    Json(req): Json<GoalProjectionRequest>,
) -> Result<Json<GoalProjection>, AppError> {
    req.current_savings.check_input("current_savings")?;
    req.goal_amount.check_input("goal_amount")?;
    req.monthly_income.check_input("monthly_income")?;
    req.monthly_expense.check_input("monthly_expense")?;
    if req.goal_amount.is_negative() {
        return Err(AppError::bad_request("goal_amount must not be negative"));
    }

    Ok(Json(forecast_goal_achievement_now(
        req.current_savings,
        req.goal_amount,
        req.monthly_income,
        req.monthly_expense,
    )))
}
