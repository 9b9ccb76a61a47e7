//! Transaction storage and monthly aggregation

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{CategoryAmount, MonthlyAggregate, NewTransaction, Transaction};
use crate::money::{Money, YearMonth};
use crate::store::HistoryProvider;

impl Database {
    /// Insert a transaction, returning None when its import hash already exists
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (date, description, amount, category, import_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                tx.date.to_string(),
                tx.description,
                tx.amount.minor(),
                tx.category,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Most recent transactions first
    pub fn list_transactions(&self, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, date, description, amount, category, import_hash, created_at
            FROM transactions
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let transactions = stmt
            .query_map(params![limit], |row| {
                let date_str: String = row.get(1)?;
                let created_at_str: String = row.get(6)?;

                Ok(Transaction {
                    id: row.get(0)?,
                    date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                        .unwrap_or_default(),
                    description: row.get(2)?,
                    amount: Money::from_minor(row.get(3)?),
                    category: row.get(4)?,
                    import_hash: row.get(5)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Income and expense totals per month in `from..=to`
    pub fn get_monthly_aggregates(
        &self,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<MonthlyAggregate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT substr(date, 1, 7) AS month,
                   COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0) AS income,
                   COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0) AS expense
            FROM transactions
            WHERE date >= ? AND date <= ?
            GROUP BY month
            ORDER BY month
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![from.first_day().to_string(), to.last_day().to_string()],
                |row| {
                    let month: String = row.get(0)?;
                    let income: i64 = row.get(1)?;
                    let expense: i64 = row.get(2)?;
                    Ok((month, income, expense))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut aggregates = Vec::with_capacity(rows.len());
        for (month, income, expense) in rows {
            aggregates.push(MonthlyAggregate::new(
                month.parse()?,
                Money::from_minor(income),
                Money::from_minor(expense),
            ));
        }
        Ok(aggregates)
    }

    /// Expense totals per category in `from..=to`, largest first
    pub fn get_category_breakdown(
        &self,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<CategoryAmount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(category, 'Uncategorized') AS cat, SUM(-amount) AS total
            FROM transactions
            WHERE amount < 0 AND date >= ? AND date <= ?
            GROUP BY cat
            ORDER BY total DESC, cat
            "#,
        )?;

        let breakdown = stmt
            .query_map(
                params![from.first_day().to_string(), to.last_day().to_string()],
                |row| {
                    Ok(CategoryAmount {
                        category: row.get(0)?,
                        amount: Money::from_minor(row.get(1)?),
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(breakdown)
    }
}

impl HistoryProvider for Database {
    fn monthly_aggregates(&self, from: YearMonth, to: YearMonth) -> Result<Vec<MonthlyAggregate>> {
        self.get_monthly_aggregates(from, to)
    }

    fn category_breakdown(&self, from: YearMonth, to: YearMonth) -> Result<Vec<CategoryAmount>> {
        self.get_category_breakdown(from, to)
    }
}
