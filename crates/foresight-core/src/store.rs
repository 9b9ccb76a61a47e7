//! Collaborator traits for history and plans
//!
//! The forecasting service reads through these traits so it can run against
//! the SQLite `Database` or the `InMemoryStore` used by tests and embedders.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{CategoryAmount, ContributionRecord, MonthlyAggregate, NewPlan, Plan};
use crate::money::{Money, YearMonth};

/// Source of monthly income/expense history
pub trait HistoryProvider: Send + Sync {
    /// Aggregates for months in `from..=to`, ascending. Months without any
    /// activity are omitted.
    fn monthly_aggregates(&self, from: YearMonth, to: YearMonth) -> Result<Vec<MonthlyAggregate>>;

    /// Expense totals per category over `from..=to`, largest first
    fn category_breakdown(&self, from: YearMonth, to: YearMonth) -> Result<Vec<CategoryAmount>>;
}

/// Storage for savings plans and their contributions
pub trait PlanStore: Send + Sync {
    fn get_plan(&self, id: i64) -> Result<Option<Plan>>;

    fn list_plans(&self) -> Result<Vec<Plan>>;

    /// Insert a plan and return its id
    fn create_plan(&self, plan: &NewPlan) -> Result<i64>;

    /// Returns false when the plan did not exist
    fn delete_plan(&self, id: i64) -> Result<bool>;

    /// Record a contribution and add it to the plan's current amount
    fn record_contribution(
        &self,
        plan_id: i64,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Contributions at or after `since`, oldest first
    fn contributions_since(
        &self,
        plan_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContributionRecord>>;
}

/// In-memory implementation of both stores
#[derive(Default)]
pub struct InMemoryStore {
    history: RwLock<Vec<MonthlyAggregate>>,
    categories: RwLock<Vec<(YearMonth, CategoryAmount)>>,
    plans: RwLock<PlanState>,
}

#[derive(Default)]
struct PlanState {
    next_id: i64,
    plans: Vec<Plan>,
    contributions: Vec<(i64, ContributionRecord)>,
}

fn lock_error() -> Error {
    Error::InvalidData("Failed to acquire store lock".into())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with monthly history
    pub fn with_history(history: Vec<MonthlyAggregate>) -> Self {
        Self {
            history: RwLock::new(history),
            ..Default::default()
        }
    }

    /// Add or replace the aggregate for a month
    pub fn push_month(&self, aggregate: MonthlyAggregate) -> Result<()> {
        let mut history = self.history.write().map_err(|_| lock_error())?;
        history.retain(|m| m.month != aggregate.month);
        history.push(aggregate);
        Ok(())
    }

    /// Add category spending for a month
    pub fn push_category(&self, month: YearMonth, category: &str, amount: Money) -> Result<()> {
        let mut categories = self.categories.write().map_err(|_| lock_error())?;
        categories.push((
            month,
            CategoryAmount {
                category: category.to_string(),
                amount,
            },
        ));
        Ok(())
    }
}

impl HistoryProvider for InMemoryStore {
    fn monthly_aggregates(&self, from: YearMonth, to: YearMonth) -> Result<Vec<MonthlyAggregate>> {
        let history = self.history.read().map_err(|_| lock_error())?;
        let mut months: Vec<MonthlyAggregate> = history
            .iter()
            .filter(|m| m.month >= from && m.month <= to)
            .cloned()
            .collect();
        months.sort_by_key(|m| m.month);
        Ok(months)
    }

    fn category_breakdown(&self, from: YearMonth, to: YearMonth) -> Result<Vec<CategoryAmount>> {
        let categories = self.categories.read().map_err(|_| lock_error())?;

        let mut totals: Vec<CategoryAmount> = Vec::new();
        for (month, entry) in categories.iter() {
            if *month < from || *month > to {
                continue;
            }
            match totals.iter_mut().find(|t| t.category == entry.category) {
                Some(total) => total.amount += entry.amount,
                None => totals.push(entry.clone()),
            }
        }
        totals.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));
        Ok(totals)
    }
}

impl PlanStore for InMemoryStore {
    fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        let state = self.plans.read().map_err(|_| lock_error())?;
        Ok(state.plans.iter().find(|p| p.id == id).cloned())
    }

    fn list_plans(&self) -> Result<Vec<Plan>> {
        let state = self.plans.read().map_err(|_| lock_error())?;
        Ok(state.plans.clone())
    }

    fn create_plan(&self, plan: &NewPlan) -> Result<i64> {
        let mut state = self.plans.write().map_err(|_| lock_error())?;
        state.next_id += 1;
        let id = state.next_id;
        state.plans.push(Plan {
            id,
            name: plan.name.clone(),
            goal_amount: plan.goal_amount,
            current_amount: plan.current_amount,
            monthly_contribution: plan.monthly_contribution,
            target_date: plan.target_date,
            plan_type: plan.plan_type,
        });
        Ok(id)
    }

    fn delete_plan(&self, id: i64) -> Result<bool> {
        let mut state = self.plans.write().map_err(|_| lock_error())?;
        let before = state.plans.len();
        state.plans.retain(|p| p.id != id);
        state.contributions.retain(|(plan_id, _)| *plan_id != id);
        Ok(state.plans.len() != before)
    }

    fn record_contribution(
        &self,
        plan_id: i64,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.plans.write().map_err(|_| lock_error())?;
        let plan = state
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| Error::NotFound(format!("Plan {}", plan_id)))?;
        plan.current_amount += amount;
        state
            .contributions
            .push((plan_id, ContributionRecord { amount, occurred_at }));
        Ok(())
    }

    fn contributions_since(
        &self,
        plan_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContributionRecord>> {
        let state = self.plans.read().map_err(|_| lock_error())?;
        let mut records: Vec<ContributionRecord> = state
            .contributions
            .iter()
            .filter(|(id, c)| *id == plan_id && c.occurred_at >= since)
            .map(|(_, c)| c.clone())
            .collect();
        records.sort_by_key(|c| c.occurred_at);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanType;
    use chrono::TimeZone;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_monthly_aggregates_range_and_order() {
        let store = InMemoryStore::new();
        for m in [3, 1, 2, 5] {
            store
                .push_month(MonthlyAggregate::new(
                    ym(2024, m),
                    Money::zero(),
                    Money::from_minor(m as i64),
                ))
                .unwrap();
        }
        let months = store.monthly_aggregates(ym(2024, 1), ym(2024, 3)).unwrap();
        let labels: Vec<u32> = months.iter().map(|m| m.month.month()).collect();
        assert_eq!(labels, vec![1, 2, 3]);
    }

    #[test]
    fn test_category_breakdown_sums_and_sorts() {
        let store = InMemoryStore::new();
        store.push_category(ym(2024, 1), "Dining", Money::from_minor(5_000)).unwrap();
        store.push_category(ym(2024, 2), "Dining", Money::from_minor(6_000)).unwrap();
        store.push_category(ym(2024, 2), "Rent", Money::from_minor(100_000)).unwrap();
        store.push_category(ym(2023, 12), "Travel", Money::from_minor(900_000)).unwrap();

        let breakdown = store.category_breakdown(ym(2024, 1), ym(2024, 2)).unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Rent");
        assert_eq!(breakdown[1].amount, Money::from_minor(11_000));
    }

    #[test]
    fn test_plan_lifecycle() {
        let store = InMemoryStore::new();
        let id = store
            .create_plan(&NewPlan {
                name: "Bike".to_string(),
                goal_amount: Money::from_minor(150_000),
                current_amount: Money::zero(),
                monthly_contribution: Money::from_minor(10_000),
                target_date: None,
                plan_type: PlanType::Purchase,
            })
            .unwrap();

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        store.record_contribution(id, Money::from_minor(25_000), at).unwrap();

        let plan = store.get_plan(id).unwrap().unwrap();
        assert_eq!(plan.current_amount, Money::from_minor(25_000));
        assert_eq!(store.contributions_since(id, at).unwrap().len(), 1);
        assert!(store
            .contributions_since(id, at + chrono::Duration::seconds(1))
            .unwrap()
            .is_empty());

        assert!(store.delete_plan(id).unwrap());
        assert!(!store.delete_plan(id).unwrap());
        assert!(store.get_plan(id).unwrap().is_none());
    }

    #[test]
    fn test_contribution_to_missing_plan() {
        let store = InMemoryStore::new();
        let err = store
            .record_contribution(42, Money::from_minor(1), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
