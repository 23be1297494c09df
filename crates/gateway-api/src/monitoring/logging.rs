//! Structured JSON logging setup, run once at process startup.
//!
//! Request-scoped correlation (the `request_id` field on every log line
//! inside a handler) comes from the `tracing::info_span!` that
//! [`crate::api::middleware::RequestTelemetryMiddleware`] opens around
//! each call, not from a separate correlation-id layer.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global `tracing` subscriber: JSON output, env-filter
/// controlled by `RUST_LOG` (defaults to `info`).
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let formatting_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .json();

    tracing_subscriber::registry().with(env_filter).with(formatting_layer).init();
}
