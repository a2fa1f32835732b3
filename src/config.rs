//! Configuration loader for the `parisar-aqi` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Seconds to wait for a pool connection before a storage call fails.
    pub db_acquire_timeout_secs: u32,

    /// Period of the fleet-summary refresh task, in seconds.
    pub summary_refresh_secs: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `DB_ACQUIRE_TIMEOUT_SECS` – pool acquire timeout (default: 5)
/// - `SUMMARY_REFRESH_SECS` – fleet-summary refresh period (default: 3600)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let db_acquire_timeout_secs = parse_env_u32!("DB_ACQUIRE_TIMEOUT_SECS", 5);
    let summary_refresh_secs = parse_env_u32!("SUMMARY_REFRESH_SECS", 3600);

    Ok(Config {
        db_url,
        db_pool_max,
        db_acquire_timeout_secs,
        summary_refresh_secs,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        // Mask the password in the database URL for security
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL             : {}", masked_db_url);
        tracing::info!("  DB_POOL_MAX              : {}", self.db_pool_max);
        tracing::info!("  DB_ACQUIRE_TIMEOUT_SECS  : {}", self.db_acquire_timeout_secs);
        tracing::info!("  SUMMARY_REFRESH_SECS     : {}", self.summary_refresh_secs);
    }
}
