//! Savings plans and contributions

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ContributionRecord, NewPlan, Plan};
use crate::money::Money;
use crate::store::PlanStore;

const PLAN_COLUMNS: &str =
    "id, name, goal_amount, current_amount, monthly_contribution, target_date, plan_type";

fn row_to_plan(row: &Row) -> rusqlite::Result<Plan> {
    let target_str: Option<String> = row.get(5)?;
    let plan_type_str: String = row.get(6)?;

    Ok(Plan {
        id: row.get(0)?,
        name: row.get(1)?,
        goal_amount: Money::from_minor(row.get(2)?),
        current_amount: Money::from_minor(row.get(3)?),
        monthly_contribution: Money::from_minor(row.get(4)?),
        target_date: target_str.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        plan_type: plan_type_str.parse().unwrap_or_default(),
    })
}

impl Database {
    pub fn create_plan(&self, plan: &NewPlan) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO plans (name, goal_amount, current_amount, monthly_contribution, target_date, plan_type)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                plan.name,
                plan.goal_amount.minor(),
                plan.current_amount.minor(),
                plan.monthly_contribution.minor(),
                plan.target_date.map(|d| d.to_string()),
                plan.plan_type.as_str(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!("Created plan {} ({})", id, plan.name);
        Ok(id)
    }

    pub fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        let conn = self.conn()?;
        let plan = conn
            .query_row(
                &format!("SELECT {} FROM plans WHERE id = ?", PLAN_COLUMNS),
                params![id],
                row_to_plan,
            )
            .optional()?;
        Ok(plan)
    }

    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM plans ORDER BY id", PLAN_COLUMNS))?;
        let plans = stmt
            .query_map([], row_to_plan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(plans)
    }

    /// Replace a plan's editable fields. Returns false when it does not exist.
    pub fn update_plan(&self, id: i64, plan: &NewPlan) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE plans
            SET name = ?, goal_amount = ?, current_amount = ?, monthly_contribution = ?,
                target_date = ?, plan_type = ?
            WHERE id = ?
            "#,
            params![
                plan.name,
                plan.goal_amount.minor(),
                plan.current_amount.minor(),
                plan.monthly_contribution.minor(),
                plan.target_date.map(|d| d.to_string()),
                plan.plan_type.as_str(),
                id,
            ],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_plan(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM contributions WHERE plan_id = ?", params![id])?;
        let deleted = tx.execute("DELETE FROM plans WHERE id = ?", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Record a contribution and add it to the plan's current amount
    pub fn record_contribution(
        &self,
        plan_id: i64,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE plans SET current_amount = current_amount + ? WHERE id = ?",
            params![amount.minor(), plan_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Plan {}", plan_id)));
        }

        tx.execute(
            "INSERT INTO contributions (plan_id, amount, occurred_at) VALUES (?, ?, ?)",
            params![plan_id, amount.minor(), format_datetime(occurred_at)],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Contributions at or after `since`, oldest first
    pub fn contributions_since(
        &self,
        plan_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContributionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT amount, occurred_at
            FROM contributions
            WHERE plan_id = ? AND occurred_at >= ?
            ORDER BY occurred_at, id
            "#,
        )?;

        let records = stmt
            .query_map(params![plan_id, format_datetime(since)], |row| {
                let occurred_str: String = row.get(1)?;
                Ok(ContributionRecord {
                    amount: Money::from_minor(row.get(0)?),
                    occurred_at: parse_datetime(&occurred_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl PlanStore for Database {
    fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        Database::get_plan(self, id)
    }

    fn list_plans(&self) -> Result<Vec<Plan>> {
        Database::list_plans(self)
    }

    fn create_plan(&self, plan: &NewPlan) -> Result<i64> {
        Database::create_plan(self, plan)
    }

    fn delete_plan(&self, id: i64) -> Result<bool> {
        Database::delete_plan(self, id)
    }

    fn record_contribution(
        &self,
        plan_id: i64,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        Database::record_contribution(self, plan_id, amount, occurred_at)
    }

    fn contributions_since(
        &self,
        plan_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContributionRecord>> {
        Database::contributions_since(self, plan_id, since)
    }
}
