//! Observability: structured logging setup and Prometheus metrics.

pub mod logging;
pub mod metrics;
