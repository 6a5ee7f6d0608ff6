//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::str::FromStr;

use karat_core::settings::{DEFAULT_CASH_LIMIT_MAJOR, DEFAULT_FINISHED_GOODS_TAX_BPS};
use karat_core::validation::validate_tax_rate_bps;
use karat_core::{EngineSettings, Money, TaxRate};
use serde::{Deserialize, Serialize};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Bind address
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Finished-goods tax in basis points (300 = 3%)
    pub finished_goods_tax_bps: u32,

    /// Cash threshold in whole currency units
    pub cash_limit: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: parse_var("KARAT_HTTP_PORT", "8080")?,

            bind_addr: env::var("KARAT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            database_path: env::var("KARAT_DATABASE_PATH")
                .unwrap_or_else(|_| "./karat.db".to_string()),

            db_max_connections: parse_var("KARAT_DB_MAX_CONNECTIONS", "5")?,

            finished_goods_tax_bps: parse_var(
                "KARAT_FINISHED_GOODS_TAX_BPS",
                &DEFAULT_FINISHED_GOODS_TAX_BPS.to_string(),
            )?,

            cash_limit: parse_var("KARAT_CASH_LIMIT", &DEFAULT_CASH_LIMIT_MAJOR.to_string())?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("KARAT_DB_MAX_CONNECTIONS".to_string()));
        }
        validate_tax_rate_bps(config.finished_goods_tax_bps)
            .map_err(|_| ConfigError::InvalidValue("KARAT_FINISHED_GOODS_TAX_BPS".to_string()))?;
        if config.cash_limit <= 0 {
            return Err(ConfigError::InvalidValue("KARAT_CASH_LIMIT".to_string()));
        }

        Ok(config)
    }

    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }

    /// Engine tunables handed to the database layer.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::new(
            TaxRate::from_bps(self.finished_goods_tax_bps),
            Money::from_major(self.cash_limit),
        )
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_settings_from_config() {
        let config = ApiConfig {
            http_port: 8080,
            bind_addr: "127.0.0.1".to_string(),
            database_path: ":memory:".to_string(),
            db_max_connections: 1,
            finished_goods_tax_bps: 300,
            cash_limit: 200_000,
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.engine_settings(), EngineSettings::default());
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        // Unset variables fall back to the default string.
        let port: u16 = parse_var("KARAT_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);

        let err = parse_var::<u16>("KARAT_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for KARAT_TEST_UNSET_PORT");
    }
}
