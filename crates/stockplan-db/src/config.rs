//! Application configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, then turned into a [`DbConfig`] for the pool.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::pool::DbConfig;

/// Runtime configuration shared by the binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pool connections
    pub max_connections: u32,

    /// Settlement attempts before a conflict is surfaced
    pub settle_attempts: u32,

    /// tracing filter directive (RUST_LOG syntax)
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = AppConfig {
            database_path: env::var("STOCKPLAN_DB_PATH")
                .unwrap_or_else(|_| "./stockplan_dev.db".to_string())
                .into(),

            max_connections: env::var("STOCKPLAN_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKPLAN_MAX_CONNECTIONS".to_string()))?,

            settle_attempts: env::var("STOCKPLAN_SETTLE_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKPLAN_SETTLE_RETRIES".to_string()))?,

            log_filter: env::var("STOCKPLAN_LOG")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKPLAN_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.settle_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKPLAN_SETTLE_RETRIES".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .settle_attempts(self.settle_attempts)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
