//! Environment configuration utilities.
//!
//! Small typed wrapper over `std::env::var` used by [`super::AppConfig`] and
//! by the per-provider API key loader, so every env-var access goes through
//! one place that reports a consistent [`super::ConfigError`].

use crate::config::{ConfigError, ConfigResult};
use std::env;
use std::str::FromStr;

/// Environment variable loader with type conversion and validation.
pub struct EnvLoader;

impl EnvLoader {
    /// Load a required environment variable.
    pub fn load_required<T>(key: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = env::var(key).map_err(|_| ConfigError::env_var_not_found(key))?;
        value.parse().map_err(|e| ConfigError::parse_error(key, e))
    }

    /// Load an optional environment variable with a default value.
    pub fn load_with_default<T>(key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(key) {
            Ok(value) => value.parse().map_err(|e| ConfigError::parse_error(key, e)),
            Err(_) => Ok(default),
        }
    }

    /// Load an optional environment variable.
    pub fn load_optional<T>(key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(key) {
            Ok(value) => Ok(Some(
                value.parse().map_err(|e| ConfigError::parse_error(key, e))?,
            )),
            Err(_) => Ok(None),
        }
    }

    /// Load a boolean environment variable, accepting common string variants.
    pub fn load_bool(key: &str, default: bool) -> bool {
        match env::var(key).as_deref() {
            Ok("true" | "True" | "TRUE" | "1" | "yes" | "on") => true,
            Ok("false" | "False" | "FALSE" | "0" | "no" | "off") => false,
            _ => default,
        }
    }

    /// Collect all environment variables matching a `PREFIX_*_SUFFIX` shape
    /// into a map keyed by the middle segment, lowercased. Used to load
    /// per-provider API keys (`GOOGLEBOOKS_API_KEY` -> `"googlebooks"`).
    pub fn load_prefixed_suffixed(prefix: &str, suffix: &str) -> std::collections::HashMap<String, String> {
        let mut out = std::collections::HashMap::new();
        for (key, value) in env::vars() {
            if let Some(rest) = key.strip_suffix(suffix) {
                if !prefix.is_empty() {
                    if let Some(tag) = rest.strip_prefix(prefix) {
                        out.insert(tag.trim_start_matches('_').to_lowercase(), value);
                    }
                } else {
                    out.insert(rest.trim_end_matches('_').to_lowercase(), value);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn load_with_default_falls_back_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("GW_TEST_ENV_UTILS_PORT");
        let port: u16 = EnvLoader::load_with_default("GW_TEST_ENV_UTILS_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn load_bool_accepts_common_variants() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("GW_TEST_ENV_UTILS_FLAG", "yes");
        assert!(EnvLoader::load_bool("GW_TEST_ENV_UTILS_FLAG", false));
        env::set_var("GW_TEST_ENV_UTILS_FLAG", "0");
        assert!(!EnvLoader::load_bool("GW_TEST_ENV_UTILS_FLAG", true));
        env::remove_var("GW_TEST_ENV_UTILS_FLAG");
    }

    #[test]
    fn load_prefixed_suffixed_extracts_provider_tag() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("GOOGLEBOOKS_API_KEY", "secret123");
        let keys = EnvLoader::load_prefixed_suffixed("", "_API_KEY");
        assert_eq!(keys.get("googlebooks"), Some(&"secret123".to_string()));
        env::remove_var("GOOGLEBOOKS_API_KEY");
    }
}
