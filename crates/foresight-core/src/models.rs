//! Data models for Foresight
//!
//! Inputs come from the history provider and plan store; outputs are the
//! result records returned by the forecasting engines. Every monetary field
//! is `Money` (minor units).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::{Money, YearMonth};

/// Sentinel month count for goals that cannot be reached at the given pace.
///
/// A large finite number rather than infinity so projections stay
/// serializable and comparable.
pub const MONTHS_UNREACHABLE: u32 = 9_999;

// ========== History ==========

/// Income and expense totals for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: YearMonth,
    pub income: Money,
    pub expense: Money,
}

impl MonthlyAggregate {
    pub fn new(month: YearMonth, income: Money, expense: Money) -> Self {
        Self {
            month,
            income,
            expense,
        }
    }

    /// Income minus expense for the month
    pub fn balance(&self) -> Money {
        self.income - self.expense
    }
}

/// Amount attributed to one spending category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Money,
}

/// A stored transaction (negative amount = expense)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub category: Option<String>,
    pub import_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A transaction to be inserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub category: Option<String>,
    pub import_hash: String,
}

// ========== Expense forecast ==========

/// Direction of recent spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next-month expense prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseForecast {
    /// The month being predicted
    pub month: YearMonth,
    pub predicted_expense: Money,
    /// 0-100; the estimator itself only produces 50-95
    pub confidence: u8,
    pub breakdown: Vec<CategoryAmount>,
    pub trend: Trend,
    /// Recent vs. older average change that produced `trend`
    pub percent_change: f64,
    pub factors: Vec<String>,
}

impl ExpenseForecast {
    /// Attach a per-category breakdown
    pub fn with_breakdown(mut self, breakdown: Vec<CategoryAmount>) -> Self {
        self.breakdown = breakdown;
        self
    }
}

// ========== Plans and goals ==========

/// Kind of financial plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Savings,
    Investment,
    DebtPayoff,
    Purchase,
    EmergencyFund,
    Other,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Savings => "savings",
            PlanType::Investment => "investment",
            PlanType::DebtPayoff => "debt_payoff",
            PlanType::Purchase => "purchase",
            PlanType::EmergencyFund => "emergency_fund",
            PlanType::Other => "other",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "savings" => Ok(PlanType::Savings),
            "investment" => Ok(PlanType::Investment),
            "debt_payoff" => Ok(PlanType::DebtPayoff),
            "purchase" => Ok(PlanType::Purchase),
            "emergency_fund" => Ok(PlanType::EmergencyFund),
            "other" => Ok(PlanType::Other),
            _ => Err(format!(
                "Unknown plan type: {} (valid: savings, investment, debt_payoff, purchase, emergency_fund, other)",
                s
            )),
        }
    }
}

/// A savings goal as stored by the plan store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub goal_amount: Money,
    pub current_amount: Money,
    pub monthly_contribution: Money,
    pub target_date: Option<NaiveDate>,
    pub plan_type: PlanType,
}

/// A plan to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub goal_amount: Money,
    #[serde(default)]
    pub current_amount: Money,
    #[serde(default)]
    pub monthly_contribution: Money,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub plan_type: PlanType,
}

/// One historical top-up of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Projection at a fixed monthly contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalScenario {
    pub monthly_amount: Money,
    /// `MONTHS_UNREACHABLE` when `monthly_amount` is zero or negative
    pub months_to_goal: u32,
    pub completion_date: Option<NaiveDate>,
}

impl GoalScenario {
    pub fn is_reachable(&self) -> bool {
        self.months_to_goal != MONTHS_UNREACHABLE
    }
}

/// The three named contribution scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalScenarios {
    /// 0.7x the average contribution
    pub conservative: GoalScenario,
    /// The average contribution
    pub current: GoalScenario,
    /// 1.5x the average contribution
    pub aggressive: GoalScenario,
}

/// Plan-based goal projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalForecast {
    pub plan_id: i64,
    pub plan_name: String,
    pub goal_amount: Money,
    pub current_amount: Money,
    pub remaining_amount: Money,
    pub progress_percentage: f64,
    /// The contribution the plan was set up with
    pub current_monthly_contribution: Money,
    /// Trailing-window average of actual contributions
    pub average_monthly_contribution: Money,
    /// `None` when there is no contribution signal to project from
    pub months_to_goal: Option<u32>,
    pub estimated_completion_date: Option<NaiveDate>,
    pub months_until_target: Option<u32>,
    pub recommended_monthly_contribution: Money,
    pub scenarios: GoalScenarios,
    pub advice: String,
}

/// How achievable a goal is given the savings rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    Easy,
    Moderate,
    Challenging,
    Unrealistic,
}

impl Feasibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feasibility::Easy => "easy",
            Feasibility::Moderate => "moderate",
            Feasibility::Challenging => "challenging",
            Feasibility::Unrealistic => "unrealistic",
        }
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Simplified goal projection from a flat monthly balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProjection {
    pub current_savings: Money,
    pub goal_amount: Money,
    pub remaining_amount: Money,
    pub monthly_balance: Money,
    pub savings_rate: f64,
    /// `MONTHS_UNREACHABLE` when the monthly balance is not positive
    pub months_to_goal: u32,
    pub estimated_completion_date: Option<NaiveDate>,
    pub feasibility: Feasibility,
    pub recommendations: Vec<String>,
}

// ========== What-if scenarios ==========

/// Which side of the budget a scenario changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affects {
    Income,
    Expense,
}

impl Affects {
    pub fn as_str(&self) -> &'static str {
        match self {
            Affects::Income => "income",
            Affects::Expense => "expense",
        }
    }
}

impl fmt::Display for Affects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Affects {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Affects::Income),
            "expense" | "expenses" => Ok(Affects::Expense),
            _ => Err(format!("Unknown scenario target: {} (valid: income, expense)", s)),
        }
    }
}

/// A user-authored hypothetical recurring change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Signed change applied every month
    pub monthly_change: Money,
    pub affects: Affects,
    #[serde(default)]
    pub category: Option<String>,
}

/// Cumulative balances at the end of one simulated month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month: YearMonth,
    pub original: Money,
    pub new: Money,
}

/// Outcome of simulating a scenario against the unmodified baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: WhatIfScenario,
    pub original_balance: Money,
    pub new_balance: Money,
    pub difference: Money,
    pub impact_percentage: f64,
    pub recommendation: String,
    /// Cumulative, not per-month
    pub timeline: Vec<TimelinePoint>,
}
