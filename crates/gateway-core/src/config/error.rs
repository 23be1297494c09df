//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating [`super::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("failed to parse {key}: {source}")]
    ParseError { key: String, source: String },
}

impl ConfigError {
    pub fn env_var_not_found(key: impl Into<String>) -> Self {
        ConfigError::EnvVarNotFound(key.into())
    }

    pub fn parse_error(key: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ConfigError::ParseError {
            key: key.into(),
            source: source.to_string(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
