//! Forecasting engines
//!
//! - Trend & confidence estimator: next-month expense from monthly history
//! - Goal projector: time-to-target and contribution scenarios
//! - Scenario simulator: cumulative balance under a what-if change
//! - Advice: rule-based text over the computed numbers
//! - Service: fetch from the stores, run an engine, optionally add a narrative
//!
//! The engines are synchronous pure functions. Only the service is async,
//! and only because narrative enrichment may call out to an AI backend.

pub mod advice;
pub mod goals;
pub mod narrative;
pub mod scenario;
pub mod service;
pub mod trend;

pub use goals::{
    calculate_goal_forecast, calculate_goal_forecast_now, forecast_goal_achievement,
    forecast_goal_achievement_now,
};
pub use narrative::{NarrativePrompt, Narrator, NARRATIVE_FALLBACK};
pub use scenario::{simulate_scenario, simulate_scenario_from_now};
pub use service::{ForecastReport, ForecastService, GoalReport};
pub use trend::forecast_next_month;

/// Fewest monthly aggregates the trend estimator accepts
pub const MIN_HISTORY_MONTHS: usize = 2;

/// Months in the "recent" side of the trend comparison
pub const TREND_RECENT_MONTHS: usize = 3;

/// Percent change below which spending counts as stable
pub const STABLE_THRESHOLD_PERCENT: f64 = 5.0;

/// Percent change at or above which a trend is called sharp
pub const SHARP_CHANGE_PERCENT: f64 = 20.0;

/// Confidence bounds for the expense forecast
pub const MIN_CONFIDENCE: f64 = 50.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

/// Trailing window used to average actual contributions
pub const CONTRIBUTION_WINDOW_MONTHS: u32 = 3;

/// Horizon used to suggest a starting contribution when there is none
pub const PLANNING_HORIZON_MONTHS: u32 = 12;

/// Contribution multipliers for the named goal scenarios
pub const CONSERVATIVE_MULTIPLIER: f64 = 0.7;
pub const CURRENT_MULTIPLIER: f64 = 1.0;
pub const AGGRESSIVE_MULTIPLIER: f64 = 1.5;

/// Savings-rate thresholds (percent of income) for feasibility tiers
pub const EASY_SAVINGS_RATE: f64 = 30.0;
pub const MODERATE_SAVINGS_RATE: f64 = 15.0;
pub const CHALLENGING_SAVINGS_RATE: f64 = 5.0;

/// Default length of a scenario simulation
pub const DEFAULT_SIMULATION_MONTHS: u32 = 12;

/// Trailing months averaged for a simulation baseline when none is given
pub const BASELINE_MONTHS: u32 = 3;
