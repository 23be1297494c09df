//! # Gateway API
//!
//! HTTP surface and Postgres-backed storage for the collectibles metadata
//! aggregation gateway. `gateway-core` defines the cache/provider/telemetry
//! contracts as trait objects; this crate wires concrete implementations
//! of them — Diesel storage, reqwest-based fetchers, actix-web handlers —
//! together into a runnable service.
//!
//! ## Modules
//!
//! - [`api`]: HTTP routes, request validation, response envelopes, and
//!   the request-telemetry middleware.
//! - [`config`]: environment-driven application configuration.
//! - [`db`]: connection pooling, Diesel schema, and the concrete
//!   `ItemCacheStore`/`SearchCacheStore` implementation.
//! - [`fanout`]: the settle-all coordinator for multi-source search.
//! - [`fetch`]: the HTTP client and anti-bot proxy session backend.
//! - [`providers`]: concrete `ProviderClient` implementations and
//!   registry wiring.
//! - [`refresher`]: the background cache-refresh loop.
//! - [`shell`]: the generic cache/fetch/normalize wrappers every handler
//!   calls through.
//! - [`monitoring`]: structured logging and Prometheus metrics.

pub mod api;
pub mod config;
pub mod db;
pub mod fanout;
pub mod fetch;
pub mod monitoring;
pub mod providers;
pub mod refresher;
pub mod shell;

pub use config::AppConfig;

/// Current version of the gateway.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
