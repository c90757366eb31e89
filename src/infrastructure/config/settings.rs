//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; `STOCKFLOW_DATABASE` and
//! `STOCKFLOW_LOG_LEVEL` override the file when set.
//!
//! # Example
//!
//! ```no_run
//! use stockflow::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::events::EventsConfig;
use super::logging::LoggingConfig;
use super::orders::{OrdersConfig, ReconcilerConfig};
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "STOCKFLOW_DATABASE";
/// Environment variable overriding the configured log level.
pub const LOG_LEVEL_ENV: &str = "STOCKFLOW_LOG_LEVEL";

/// Which adapters back the stores, sequence, and event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// Durable SQLite database at [`Config::database`].
    #[default]
    Sqlite,
    /// Process-local state, lost on exit.
    Memory,
}

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: Storage,

    /// Path to SQLite database file.
    ///
    /// Defaults to "stockflow.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub orders: OrdersConfig,

    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

fn default_database_path() -> String {
    "stockflow.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: Storage::default(),
            database: default_database_path(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            events: EventsConfig::default(),
            orders: OrdersConfig::default(),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides,
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(database) = non_empty_env(DATABASE_ENV) {
            self.database = database;
        }
        if let Some(level) = non_empty_env(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.storage == Storage::Sqlite && self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.ttl_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cache.enabled && self.cache.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.sweep_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let events = &self.events;
        if events.topic.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "events.topic",
            }
            .into());
        }
        if events.partitions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.partitions",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if events.members == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.members",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if events.member_index >= events.members {
            return Err(ConfigError::InvalidValue {
                field: "events.member_index",
                reason: format!("must be below members ({})", events.members),
            }
            .into());
        }
        if events.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if events.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.batch_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.orders.rpc_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "orders.rpc_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.events.poll_interval_ms)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::InvalidValue {
                field: "config",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
