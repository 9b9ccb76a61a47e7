//! Savings plan handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use foresight_core::{GoalReport, Money, NewPlan, Plan};

/// Request body for recording a contribution
#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    pub amount: Money,
    /// Defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Query parameters for a plan forecast
#[derive(Debug, Deserialize)]
pub struct PlanForecastQuery {
    #[serde(default)]
    pub narrate: bool,
}

fn validate_plan(req: &NewPlan) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Plan name is required"));
    }
    req.goal_amount.check_input("goal_amount")?;
    req.current_amount.check_input("current_amount")?;
    req.monthly_contribution.check_input("monthly_contribution")?;
    if !req.goal_amount.is_positive() {
        return Err(AppError::bad_request("goal_amount must be positive"));
    }
    Ok(())
}

/// GET /api/plans - List all plans
pub async fn list_plans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(state.db.list_plans()?))
}

/// POST /api/plans - Create a plan
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewPlan>,
) -> Result<Json<Plan>, AppError> {
    validate_plan(&req)?;

    let id = state.db.create_plan(&req)?;
    info!(plan_id = id, name = %req.name, "Plan created");

    let plan = state
        .db
        .get_plan(id)?
        .ok_or_else(|| AppError::not_found("Plan not found after creation"))?;
    Ok(Json(plan))
}

/// GET /api/plans/:id - Get a plan
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Plan>, AppError> {
    state
        .db
        .get_plan(id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Plan not found"))
}

/// PUT /api/plans/:id - Replace a plan's details
pub async fn update_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<NewPlan>,
) -> Result<Json<Plan>, AppError> {
    validate_plan(&req)?;
    if !state.db.update_plan(id, &req)? {
        return Err(AppError::not_found("Plan not found"));
    }
    info!(plan_id = id, "Plan updated");

    state
        .db
        .get_plan(id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Plan not found"))
}

/// DELETE /api/plans/:id - Delete a plan and its contributions
pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_plan(id)? {
        return Err(AppError::not_found("Plan not found"));
    }
    info!(plan_id = id, "Plan deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/plans/:id/contributions - Record a contribution
pub async fn add_contribution(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ContributionRequest>,
) -> Result<Json<Plan>, AppError> {
    req.amount.check_input("amount")?;
    if req.amount.is_zero() {
        return Err(AppError::bad_request("Contribution amount must not be zero"));
    }

    let occurred_at = req.occurred_at.unwrap_or_else(Utc::now);
    state.db.record_contribution(id, req.amount, occurred_at)?;

    let plan = state
        .db
        .get_plan(id)?
        .ok_or_else(|| AppError::not_found("Plan not found"))?;
    Ok(Json(plan))
}

/// GET /api/plans/:id/forecast - Project a plan from its contribution history
pub async fn plan_forecast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<PlanForecastQuery>,
) -> Result<Json<GoalReport>, AppError> {
    let report = state
        .service
        .goal_report(&state.db, id, Utc::now().date_naive(), params.narrate)
        .await?;
    Ok(Json(report))
}
