//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `build_service` - Forecast service from config and environment
//! - `currency_symbol` - Configured symbol for plain listings
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use foresight_core::{Database, EngineConfig, ForecastService, DEFAULT_CURRENCY_SYMBOL};
use tracing::warn;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load the engine config and attach a narrative backend if one is configured
pub fn build_service() -> Result<ForecastService> {
    let config = EngineConfig::load().context("Failed to load engine config")?;
    Ok(ForecastService::from_env(config))
}

/// Configured currency symbol for commands that don't need a full service
pub fn currency_symbol() -> String {
    match EngineConfig::load() {
        Ok(config) => config.currency_symbol,
        Err(e) => {
            warn!("Failed to load engine config, using {}: {}", DEFAULT_CURRENCY_SYMBOL, e);
            DEFAULT_CURRENCY_SYMBOL.to_string()
        }
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: foresight import --file statement.csv");
    println!("  2. Forecast next month: foresight forecast");
    println!("  3. Start the API: foresight serve");

    Ok(())
}
