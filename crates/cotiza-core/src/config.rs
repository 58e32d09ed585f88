//! Application configuration
//!
//! This module provides centralized configuration management using the
//! `config` crate. Configuration can be loaded from environment variables
//! and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub quoting: QuotingConfig,
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Break-glass administrative access configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// Out-of-band secret enabling the administrative override path.
    /// When unset, the override path is disabled entirely.
    pub override_secret: Option<String>,
}

/// Quoting defaults
#[derive(Debug, Deserialize, Clone)]
pub struct QuotingConfig {
    /// Currency assigned to companies that do not specify one
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Days until a freshly issued quote may be expired
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: i64,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_expiry_days() -> i64 {
    30
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            default_expiry_days: default_expiry_days(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("quoting.default_currency", "USD")?
            .set_default("quoting.default_expiry_days", 30)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with COTIZA_ prefix
            .add_source(
                Environment::with_prefix("COTIZA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("COTIZA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quoting_config() {
        let config = QuotingConfig::default();
        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.default_expiry_days, 30);
    }

    #[test]
    fn test_admin_override_disabled_by_default() {
        let config = AdminConfig::default();
        assert!(config.override_secret.is_none());
    }
}
