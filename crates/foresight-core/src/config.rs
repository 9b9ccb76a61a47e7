//! Engine configuration
//!
//! Loaded from TOML with two-layer resolution: the override at
//! `~/.local/share/foresight/config/foresight.toml` if it exists, else the
//! default embedded at build time. Missing keys fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::money::DEFAULT_CURRENCY_SYMBOL;

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/foresight.toml");

/// Settings shared by the forecast service, CLI and server
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Months of history used for the expense forecast
    pub history_months: u32,
    /// Default simulation length
    pub simulation_months: u32,
    /// Whether narrative enrichment runs when requested
    pub narrative_enabled: bool,
    /// Upper bound on a single enrichment call
    pub narrative_timeout: Duration,
    /// Symbol used when formatting money for people
    pub currency_symbol: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_months: 6,
            simulation_months: 12,
            narrative_enabled: true,
            narrative_timeout: Duration::from_secs(10),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load the override if present, else the embedded default
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Load from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse TOML content, filling in defaults for missing keys
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(forecast) = raw.forecast {
            if let Some(months) = forecast.history_months {
                if months < 2 {
                    return Err(Error::Config(
                        "forecast.history_months must be at least 2".into(),
                    ));
                }
                config.history_months = months;
            }
        }

        if let Some(simulation) = raw.simulation {
            if let Some(months) = simulation.default_months {
                config.simulation_months = months;
            }
        }

        if let Some(narrative) = raw.narrative {
            if let Some(enabled) = narrative.enabled {
                config.narrative_enabled = enabled;
            }
            if let Some(secs) = narrative.timeout_secs {
                config.narrative_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(display) = raw.display {
            if let Some(symbol) = display.currency_symbol {
                config.currency_symbol = symbol;
            }
        }

        Ok(config)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("foresight").join("config").join("foresight.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    forecast: Option<RawForecast>,
    simulation: Option<RawSimulation>,
    narrative: Option<RawNarrative>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    history_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawSimulation {
    default_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawNarrative {
    enabled: Option<bool>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    currency_symbol: Option<String>,
}
