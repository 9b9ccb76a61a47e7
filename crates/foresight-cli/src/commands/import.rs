//! CSV import command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use foresight_core::db::Database;
use foresight_core::import::{import_transactions, parse_csv};

pub fn cmd_import(db: &Database, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parse_csv(csv_file)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;

    println!("   Found {} transactions", transactions.len());

    let summary = import_transactions(db, &transactions)?;

    println!("✅ Import complete!");
    println!("   Imported: {}", summary.imported);
    println!("   Skipped (duplicates): {}", summary.skipped);

    if summary.imported > 0 {
        println!();
        println!("   Run 'foresight forecast' to predict next month's expenses.");
    }

    Ok(())
}
