//! CSV transaction import
//!
//! Expected columns (header row required, any order, case-insensitive):
//! `date`, `description`, `amount`, and optionally `category`.
//! Negative amounts are expenses, positive amounts are income.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::NewTransaction;
use crate::money::Money;

/// Outcome of importing a batch into the database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse CSV data into transactions
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    // Identical rows on the same day are separate transactions, so the
    // occurrence index is part of the hash
    let mut seen: HashMap<(NaiveDate, String, Money), u32> = HashMap::new();
    let mut transactions = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Import(format!("Row {}: missing {}", line + 2, name)))
        };

        let date = parse_date(field(columns.date, "date")?)?;
        let description = field(columns.description, "description")?.to_string();
        let amount = parse_amount(field(columns.amount, "amount")?)?;
        let category = columns
            .category
            .and_then(|idx| record.get(idx))
            .filter(|c| !c.is_empty())
            .map(String::from);

        let occurrence = seen
            .entry((date, description.clone(), amount))
            .and_modify(|n| *n += 1)
            .or_insert(0);
        let import_hash = generate_hash(&date, &description, amount, *occurrence);

        transactions.push(NewTransaction {
            date,
            description,
            amount,
            category,
            import_hash,
        });
    }

    debug!("Parsed {} transactions from CSV", transactions.len());
    Ok(transactions)
}

/// Insert parsed transactions, skipping ones already imported
pub fn import_transactions(db: &Database, transactions: &[NewTransaction]) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for tx in transactions {
        match db.insert_transaction(tx)? {
            Some(_) => summary.imported += 1,
            None => summary.skipped += 1,
        }
    }
    info!(
        "Imported {} transactions ({} duplicates skipped)",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
        };

        Ok(Self {
            date: require("date")?,
            description: require("description")?,
            amount: require("amount")?,
            category: find("category"),
        })
    }
}

/// Hash of the row's identity, stable across re-imports of the same file
fn generate_hash(date: &NaiveDate, description: &str, amount: Money, occurrence: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.minor().to_be_bytes());
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, accepting accounting-style "(12.34)" for negatives
fn parse_amount(s: &str) -> Result<Money> {
    let s = s.trim();
    let parsed = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => Money::parse(inner).map(|m| -m),
        None => Money::parse(s),
    };
    parsed.map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}
