//! Configuration management for the swap cache.
//!
//! Loads the TTL policy, store bounds, and persistence location from
//! environment variables (optionally seeded from a `.env` file). The TTLs are
//! UX-versus-backend-load policy, so none of them is hard-coded.

use crate::cache::keys::DELIMITER;
use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the swap cache.
#[derive(Debug, Clone)]
pub struct Config {
    /// Quote TTL in milliseconds (default: 3000)
    pub quote_ttl_ms: u64,

    /// Subgraph price TTL in milliseconds (default: 30000)
    pub price_ttl_ms: u64,

    /// Persisted token metadata TTL in seconds (default: 3600)
    pub token_metadata_ttl_secs: u64,

    /// Entry bound for each in-memory store (default: 10000)
    pub volatile_max_entries: usize,

    /// File backing the persistent store (default: "swap-cache.json")
    pub cache_file: PathBuf,

    /// Key namespace for persisted records (default: "swapcache")
    pub cache_namespace: String,

    /// Log level (default: "error")
    pub log_level: String,
}

/// Per-class TTLs derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Fast quote class
    pub quote: Duration,

    /// Subgraph price class
    pub price: Duration,

    /// Static token metadata class
    pub token_metadata: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Config::default().ttl_policy()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `QUOTE_CACHE_TTL_MS`: Quote TTL in milliseconds (default: 3000)
    /// - `PRICE_CACHE_TTL_MS`: Price TTL in milliseconds (default: 30000)
    /// - `TOKEN_METADATA_TTL_SECS`: Token metadata TTL in seconds (default: 3600)
    /// - `VOLATILE_CACHE_MAX_ENTRIES`: Per-store entry bound (default: 10000)
    /// - `CACHE_FILE`: Persistent cache file (default: "swap-cache.json")
    /// - `CACHE_NAMESPACE`: Persisted key namespace (default: "swapcache")
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let quote_ttl_ms = Self::parse_env_u64("QUOTE_CACHE_TTL_MS", defaults.quote_ttl_ms)?;
        let price_ttl_ms = Self::parse_env_u64("PRICE_CACHE_TTL_MS", defaults.price_ttl_ms)?;
        let token_metadata_ttl_secs =
            Self::parse_env_u64("TOKEN_METADATA_TTL_SECS", defaults.token_metadata_ttl_secs)?;
        let volatile_max_entries =
            Self::parse_env_usize("VOLATILE_CACHE_MAX_ENTRIES", defaults.volatile_max_entries)?;

        if volatile_max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                var: "VOLATILE_CACHE_MAX_ENTRIES".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let cache_file = env::var("CACHE_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_file);

        if cache_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "CACHE_FILE".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let cache_namespace =
            env::var("CACHE_NAMESPACE").unwrap_or(defaults.cache_namespace);

        if cache_namespace.trim().is_empty() || cache_namespace.contains(DELIMITER) {
            return Err(ConfigError::InvalidValue {
                var: "CACHE_NAMESPACE".to_string(),
                reason: format!("Must be non-empty and must not contain '{}'", DELIMITER),
            });
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            quote_ttl_ms,
            price_ttl_ms,
            token_metadata_ttl_secs,
            volatile_max_entries,
            cache_file,
            cache_namespace,
            log_level,
        })
    }

    /// TTLs per request class.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            quote: Duration::from_millis(self.quote_ttl_ms),
            price: Duration::from_millis(self.price_ttl_ms),
            token_metadata: Duration::from_secs(self.token_metadata_ttl_secs),
        }
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quote_ttl_ms: 3_000,
            price_ttl_ms: 30_000,
            token_metadata_ttl_secs: 3_600,
            volatile_max_entries: 10_000,
            cache_file: PathBuf::from("swap-cache.json"),
            cache_namespace: "swapcache".to_string(),
            log_level: "error".to_string(),
        }
    }
}
