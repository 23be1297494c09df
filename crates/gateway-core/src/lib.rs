//! # Gateway Core
//!
//! Provider-agnostic primitives for the collectibles metadata gateway:
//!
//! - [`error`] — the shared [`error::GatewayError`] type and its HTTP-agnostic
//!   conversions from `diesel`, `reqwest`, and `serde_json` errors.
//! - [`config`] — the cache-mode switch, background-refresher tuning, and
//!   the `EnvLoader`/`ConfigError` plumbing `gateway-api`'s `AppConfig` builds on.
//! - [`provider`] — the [`provider::ProviderClient`] trait every upstream
//!   source implements.
//! - [`registry`] — the startup-time [`registry::ProviderRegistry`] that
//!   replaces string dispatch on provider name.
//! - [`fingerprint`] — query fingerprinting and text normalization (components D).
//! - [`denormalize`] — the pure payload-to-columns projection (component B).
//! - [`cache`] — TTL policy and the storage-layer traits (components C, D).
//! - [`session`] — the anti-bot proxy session singleton (component F).
//! - [`telemetry`] — process-wide per-provider counters (component J).
//! - [`models`] — the `Item`/`Search`/`CacheCallInfo` domain types.
//!
//! ## Features
//!
//! - `database` — enables the `diesel::result::Error` conversion on
//!   [`error::GatewayError`].
//! - `monitoring` — enables the `prometheus::Error` conversion.
//! - `full` — enables all optional features.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cache;
pub mod config;
pub mod denormalize;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod provider;
pub mod registry;
pub mod session;
pub mod telemetry;
pub mod testing;

pub use error::{GatewayError, Result};
pub use models::{CacheCallInfo, CacheMatch, CacheSource, Item, Search};
pub use provider::ProviderClient;
pub use registry::{ProviderDescriptor, ProviderRegistry};

/// Current version of the gateway core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for implementing a new provider.
pub mod prelude {
    pub use crate::error::{GatewayError, Result};
    pub use crate::provider::{FetchOpts, ProviderClient, ProviderSearchResult, SearchOpts};
    pub use async_trait::async_trait;
    pub use serde_json::{json, Value};
}
