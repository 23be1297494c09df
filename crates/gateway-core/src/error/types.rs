//! # Error Handling for the Gateway Core
//!
//! This module defines [`GatewayError`], the single error type shared across
//! the storage layer, provider shell, fetch/session manager, and fan-out
//! coordinator. Every fallible operation in the gateway returns
//! `Result<T, GatewayError>`; the HTTP layer (in `gateway-api`) is
//! responsible for mapping each variant to a status code and response body.
//!
//! ## Error Categories
//!
//! - [`GatewayError::Validation`] — caller supplied bad input; surfaced as 400.
//! - [`GatewayError::UpstreamNotFound`] — the provider had nothing for this id; 404.
//! - [`GatewayError::UpstreamUnavailable`] — network/timeout/5xx from a provider; 502.
//! - [`GatewayError::Auth`] — missing or rejected provider API key; 401.
//! - [`GatewayError::RateLimited`] — provider responded 429; 429.
//! - [`GatewayError::Session`] — the anti-bot proxy session could not be established.
//! - [`GatewayError::Cache`] — a storage operation failed; never raised into the
//!   main request flow, only ever logged by the caller.
//! - [`GatewayError::Serialization`] — JSON encode/decode failure.
//! - [`GatewayError::Internal`] — anything else, treated as a 500.
//!
//! ## Usage
//!
//! ```rust
//! use gateway_core::error::GatewayError;
//!
//! fn require_query(q: &str) -> Result<(), GatewayError> {
//!     if q.trim().is_empty() {
//!         return Err(GatewayError::Validation {
//!             message: "q must not be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Cache-layer code never propagates [`GatewayError::Cache`] with `?`; it is
//! always caught at the call site and turned into a cache-miss:
//!
//! ```rust
//! use gateway_core::error::GatewayError;
//!
//! async fn get_or_none() -> Option<String> {
//!     let result: Result<String, GatewayError> = Err(GatewayError::Cache {
//!         message: "connection pool exhausted".to_string(),
//!     });
//!     match result {
//!         Ok(v) => Some(v),
//!         Err(e) => {
//!             tracing::warn!(error = %e, "cache read failed, treating as miss");
//!             None
//!         }
//!     }
//! }
//! ```

/// Primary error type for all gateway-core operations.
///
/// Each variant carries enough context to build the uniform
/// `{success:false, error, code, provider, timestamp}` failure body at the
/// HTTP boundary without re-deriving it from a string.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Caller-supplied input failed the parameter contract of the endpoint.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of what was wrong with the input
        message: String,
    },

    /// The upstream provider returned 404 or an empty identifiable payload.
    #[error("{provider}: not found: {id}")]
    UpstreamNotFound {
        /// Provider tag that reported the miss
        provider: String,
        /// Identifier that could not be resolved
        id: String,
    },

    /// The upstream provider was unreachable, timed out, or returned 5xx
    /// after retries were exhausted.
    #[error("{provider}: upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Provider tag that failed
        provider: String,
        /// Underlying failure description
        message: String,
    },

    /// A provider API key was missing or rejected by the upstream.
    #[error("{provider}: authentication failed")]
    Auth {
        /// Provider tag requiring authentication
        provider: String,
    },

    /// The upstream provider responded with 429.
    #[error("{provider}: rate limited by upstream")]
    RateLimited {
        /// Provider tag that rate limited the request
        provider: String,
        /// Optional `Retry-After` hint in seconds, if the upstream supplied one
        retry_after_secs: Option<u64>,
    },

    /// The anti-bot scraping session could not be established or was
    /// rejected mid-flight.
    #[error("scraping session error: {message}")]
    Session {
        /// Details of the session failure
        message: String,
    },

    /// A storage-layer read or write failed. Callers must treat this as a
    /// cache miss / lost write rather than propagate it to the client.
    #[error("cache error: {message}")]
    Cache {
        /// Underlying database error description
        message: String,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {message}")]
    Serialization {
        /// Details about the serialization failure
        message: String,
    },

    /// Catch-all for conditions that should never occur on a valid request.
    #[error("internal error: {message}")]
    Internal {
        /// Details about the internal failure
        message: String,
    },
}

impl GatewayError {
    /// Stable machine-readable code used in the `{code}` field of the
    /// uniform error body and in structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Validation { .. } => "VALIDATION_ERROR",
            GatewayError::UpstreamNotFound { .. } => "UPSTREAM_NOT_FOUND",
            GatewayError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            GatewayError::Auth { .. } => "AUTH_ERROR",
            GatewayError::RateLimited { .. } => "RATE_LIMITED",
            GatewayError::Session { .. } => "SESSION_ERROR",
            GatewayError::Cache { .. } => "CACHE_ERROR",
            GatewayError::Serialization { .. } => "SERIALIZATION_ERROR",
            GatewayError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Provider tag associated with this error, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            GatewayError::UpstreamNotFound { provider, .. }
            | GatewayError::UpstreamUnavailable { provider, .. }
            | GatewayError::Auth { provider }
            | GatewayError::RateLimited { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Whether the fetch/session manager should retry this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::UpstreamUnavailable { .. } | GatewayError::RateLimited { .. }
        )
    }
}

#[cfg(feature = "database")]
impl From<diesel::result::Error> for GatewayError {
    fn from(error: diesel::result::Error) -> Self {
        GatewayError::Cache {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        let provider = error.url().map(|u| u.host_str().unwrap_or("unknown").to_string());
        match provider {
            Some(provider) => GatewayError::UpstreamUnavailable {
                provider,
                message: error.to_string(),
            },
            None => GatewayError::Internal {
                message: error.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::Serialization {
            message: error.to_string(),
        }
    }
}

#[cfg(feature = "monitoring")]
impl From<prometheus::Error> for GatewayError {
    fn from(error: prometheus::Error) -> Self {
        GatewayError::Internal {
            message: format!("metrics error: {}", error),
        }
    }
}

/// Result alias used throughout the gateway crates.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_is_stable_per_variant() {
        let e = GatewayError::Validation { message: "bad".into() };
        assert_eq!(e.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn provider_is_extracted_when_present() {
        let e = GatewayError::UpstreamNotFound {
            provider: "googlebooks".into(),
            id: "abc".into(),
        };
        assert_eq!(e.provider(), Some("googlebooks"));

        let e = GatewayError::Validation { message: "bad".into() };
        assert_eq!(e.provider(), None);
    }

    #[test]
    fn rate_limited_and_upstream_unavailable_are_retryable() {
        assert!(GatewayError::RateLimited { provider: "tmdb".into(), retry_after_secs: None }.is_retryable());
        assert!(GatewayError::UpstreamUnavailable { provider: "tmdb".into(), message: "timeout".into() }.is_retryable());
        assert!(!GatewayError::Auth { provider: "tmdb".into() }.is_retryable());
    }

    #[test]
    fn serde_json_error_converts_to_serialization_variant() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let gw: GatewayError = err.into();
        assert!(matches!(gw, GatewayError::Serialization { .. }));
    }
}
