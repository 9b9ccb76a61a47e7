//! Foresight Core Library
//!
//! Forecasting engine and shared functionality for the Foresight tool:
//! - Minor-unit money arithmetic and calendar-month helpers
//! - Next-month expense forecasting with trend and confidence
//! - Goal achievement projection (time-to-target, required contribution)
//! - What-if scenario simulation over a cumulative balance timeline
//! - Rule-based advice, optionally enriched by a local AI backend
//! - SQLite-backed history provider and plan store
//! - CSV transaction import

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod money;
pub mod store;

/// Test utilities including a mock narrative server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIClient, MockBackend, NarrativeBackend, OllamaBackend, OpenAICompatibleBackend};
pub use config::EngineConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{
    calculate_goal_forecast, forecast_goal_achievement, forecast_next_month, simulate_scenario,
    ForecastReport, ForecastService, GoalReport, Narrator, NARRATIVE_FALLBACK,
};
pub use models::*;
pub use money::{Money, YearMonth, DEFAULT_CURRENCY_SYMBOL};
pub use store::{HistoryProvider, InMemoryStore, PlanStore};
