//! Configuration management for the restaurant stock service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STOCK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Ledger snapshot storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Stock rules and analytics windows
    #[serde(default)]
    pub inventory: InventorySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// JSON snapshot file. When unset the ledger lives only in memory.
    pub snapshot_path: Option<String>,

    /// Write the snapshot after every mutation, not only on shutdown
    #[serde(default)]
    pub autosave: bool,
}

/// Tunables for the status, alert and analytics rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InventorySettings {
    /// Items expiring within this many days raise an `expiring` alert
    pub expiry_warning_days: i64,

    /// Trailing window for usage rate, turnover and usage rankings
    pub usage_window_days: i64,

    /// Number of calendar months reported in monthly spending
    pub spending_months: u32,

    /// Length of the most/least used lists
    pub ranking_size: usize,

    /// Last-24h usage above `factor * usage_rate` raises a `usage-spike` alert
    pub usage_spike_factor: u32,

    /// Relative unit price change (percent) that raises a `price-change` alert
    pub price_change_percent: u32,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            expiry_warning_days: 7,
            usage_window_days: 30,
            spending_months: 6,
            ranking_size: 5,
            usage_spike_factor: 3,
            price_change_percent: 10,
        }
    }
}

impl InventorySettings {
    /// Reject windows and sizes the rules cannot work with
    pub fn validate(&self) -> AppResult<()> {
        if self.expiry_warning_days < 0 {
            return Err(AppError::Configuration(
                "inventory.expiry_warning_days cannot be negative".to_string(),
            ));
        }
        if self.usage_window_days <= 0 {
            return Err(AppError::Configuration(
                "inventory.usage_window_days must be positive".to_string(),
            ));
        }
        if self.spending_months == 0 {
            return Err(AppError::Configuration(
                "inventory.spending_months must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let environment =
            std::env::var("STOCK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.format", "pretty")?
            .set_default("storage.autosave", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCK_ prefix)
            .add_source(
                Environment::with_prefix("STOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.inventory.validate()?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(InventorySettings::default().validate().is_ok());
    }

    #[test]
    fn test_empty_usage_window_is_a_configuration_error() {
        let settings = InventorySettings {
            usage_window_days: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(AppError::Configuration(_))
        ));

        let settings = InventorySettings {
            spending_months: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_config_errors_map_to_configuration() {
        let err: AppError = ConfigError::Message("bad port".to_string()).into();
        assert!(matches!(err, AppError::Configuration(msg) if msg.contains("bad port")));
    }
}
