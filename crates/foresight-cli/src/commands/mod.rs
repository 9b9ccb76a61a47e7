//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, build_service)
//! - `import` - CSV transaction import
//! - `transactions` - Transaction listing
//! - `forecast` - Expense forecast and flat-budget goal projection
//! - `plans` - Savings plan management and plan forecasts
//! - `simulate` - What-if scenario simulation
//! - `serve` - Web server command

pub mod core;
pub mod forecast;
pub mod import;
pub mod plans;
pub mod serve;
pub mod simulate;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use forecast::*;
pub use import::*;
pub use plans::*;
pub use serve::*;
pub use simulate::*;
pub use transactions::*;

use anyhow::Result;
use foresight_core::Money;
use serde::Serialize;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

/// Print a result record as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Color an amount red when negative, green when positive
pub fn colored(amount: Money, symbol: &str) -> String {
    let text = amount.format_with_symbol(symbol);
    if amount.is_negative() {
        format!("\x1b[31m{}\x1b[0m", text)
    } else if amount.is_positive() {
        format!("\x1b[32m+{}\x1b[0m", text)
    } else {
        text
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
