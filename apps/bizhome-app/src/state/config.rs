//! # Application Configuration
//!
//! Process-level settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BIZHOME_*`)
//! 2. Defaults (this file)
//!
//! Business settings (retention, daily limit, license) are not here: they
//! live in the `configuracion` table and are read through `db.config()`.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use bizhome_core::{Money, DEFAULT_TOP_DAYS, LOW_STOCK_THRESHOLD};

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "bizhome.db";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite file. `:memory:` for a throwaway database.
    pub database_path: PathBuf,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Products below this stock show up on the dashboard
    pub low_stock_threshold: f64,

    /// Days listed in the expense ranking
    pub top_days: usize,
}

impl Default for AppConfig {
    /// ## Default Values
    /// - Database: platform data directory, else `./bizhome.db`
    /// - Currency: `$`
    /// - Low stock: below 10
    /// - Ranking: top 5 days
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path().unwrap_or_else(|| PathBuf::from(DATABASE_FILE)),
            currency_symbol: "$".to_string(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            top_days: DEFAULT_TOP_DAYS,
        }
    }
}

impl AppConfig {
    /// Creates an AppConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `BIZHOME_DB_PATH`: database file
    /// - `BIZHOME_CURRENCY_SYMBOL`: e.g. "Q", "€"
    /// - `BIZHOME_LOW_STOCK_THRESHOLD`: e.g. "5"
    /// - `BIZHOME_TOP_DAYS`: e.g. "7"
    ///
    /// Unparsable numbers are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("BIZHOME_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(symbol) = lookup("BIZHOME_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("BIZHOME_LOW_STOCK_THRESHOLD") {
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => config.low_stock_threshold = value,
                _ => warn!(value = %raw, "Ignoring invalid BIZHOME_LOW_STOCK_THRESHOLD"),
            }
        }

        if let Some(raw) = lookup("BIZHOME_TOP_DAYS") {
            match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.top_days = value,
                _ => warn!(value = %raw, "Ignoring invalid BIZHOME_TOP_DAYS"),
            }
        }

        config
    }

    /// Configuration backed by an in-memory database (tests, demos).
    pub fn in_memory() -> Self {
        AppConfig {
            database_path: PathBuf::from(bizhome_db::pool::IN_MEMORY_PATH),
            ..AppConfig::default()
        }
    }

    /// Formats an amount with two decimals and the currency symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(1234.5), "$1234.50");
    /// ```
    pub fn format_currency(&self, amount: f64) -> String {
        Money::new(amount).format_with(&self.currency_symbol)
    }
}

/// Platform data directory path of the database.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.bizhome.bizhome/bizhome.db`
/// - **Windows**: `%APPDATA%\bizhome\bizhome\data\bizhome.db`
/// - **Linux**: `~/.local/share/bizhome/bizhome.db`
pub fn default_database_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "bizhome", "bizhome").map(|dirs| dirs.data_dir().join(DATABASE_FILE))
}
