//! Configuration primitives shared by the gateway crates.
//!
//! The full `AppConfig` (which also owns the database pool) lives in
//! `gateway_api::config`; this module provides the pieces that do not
//! depend on `diesel` so they can be reused by `gateway-core` alone —
//! the cache mode switch, the background-refresher tuning knobs, and the
//! `EnvLoader`/`ConfigError` plumbing both crates build on.

pub mod env_utils;
pub mod error;
pub mod validation;

pub use env_utils::EnvLoader;
pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls whether the gateway consults upstream providers, the database,
/// or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Always call upstream; the storage layer is a no-op.
    ApiOnly,
    /// Read-through cache with write-back. Default.
    Hybrid,
    /// Only ever read from the database; never call upstream.
    DbOnly,
}

impl Default for CacheMode {
    fn default() -> Self {
        CacheMode::Hybrid
    }
}

impl std::str::FromStr for CacheMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api_only" | "api-only" => Ok(CacheMode::ApiOnly),
            "hybrid" => Ok(CacheMode::Hybrid),
            "db_only" | "db-only" => Ok(CacheMode::DbOnly),
            other => Err(ConfigError::invalid_value("CACHE_MODE", other)),
        }
    }
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CacheMode::ApiOnly => "api_only",
            CacheMode::Hybrid => "hybrid",
            CacheMode::DbOnly => "db_only",
        };
        write!(f, "{}", s)
    }
}

/// Tuning knobs for the background refresher (component H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefresherConfig {
    /// How often a refresh cycle runs.
    pub check_interval: Duration,
    /// Maximum number of items refreshed per cycle.
    pub max_refresh_per_cycle: usize,
    /// Delay between individual refresh calls within a cycle, to respect
    /// per-provider spacing even during background refresh.
    pub refresh_delay: Duration,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(600),
            max_refresh_per_cycle: 50,
            refresh_delay: Duration::from_millis(500),
        }
    }
}

impl RefresherConfig {
    pub fn from_env() -> ConfigResult<Self> {
        let check_interval_ms: u64 =
            EnvLoader::load_with_default("CHECK_INTERVAL_MS", 600_000)?;
        let max_refresh_per_cycle: usize =
            EnvLoader::load_with_default("MAX_REFRESH_PER_CYCLE", 50)?;
        let refresh_delay_ms: u64 = EnvLoader::load_with_default("REFRESH_DELAY_MS", 500)?;

        Ok(Self {
            check_interval: Duration::from_millis(check_interval_ms),
            max_refresh_per_cycle,
            refresh_delay: Duration::from_millis(refresh_delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_mode_parses_known_values() {
        assert_eq!("hybrid".parse::<CacheMode>().unwrap(), CacheMode::Hybrid);
        assert_eq!("API_ONLY".parse::<CacheMode>().unwrap(), CacheMode::ApiOnly);
        assert_eq!("db_only".parse::<CacheMode>().unwrap(), CacheMode::DbOnly);
        assert!("bogus".parse::<CacheMode>().is_err());
    }

    #[test]
    fn cache_mode_default_is_hybrid() {
        assert_eq!(CacheMode::default(), CacheMode::Hybrid);
    }

    #[test]
    fn refresher_config_has_sane_defaults() {
        let cfg = RefresherConfig::default();
        assert_eq!(cfg.max_refresh_per_cycle, 50);
        assert!(cfg.check_interval.as_secs() > 0);
    }
}
