//! Transaction command implementations

use anyhow::Result;
use foresight_core::db::Database;

use super::{colored, truncate};

pub fn cmd_transactions_list(db: &Database, limit: i64, symbol: &str) -> Result<()> {
    let transactions = db.list_transactions(limit)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  foresight import --file statement.csv");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions ({} total)", db.count_transactions()?);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        println!(
            "   {} │ {:>12} │ {:<40} │ {}",
            tx.date,
            colored(tx.amount, symbol),
            truncate(&tx.description, 40),
            tx.category.as_deref().unwrap_or("Uncategorized")
        );
    }

    Ok(())
}
