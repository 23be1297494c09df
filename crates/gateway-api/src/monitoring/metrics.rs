//! Prometheus metrics: the same counters [`gateway_core::telemetry::Telemetry`]
//! tracks in-process, additionally exposed as gauges/histograms for
//! `/metrics` scraping. The JSON counters endpoint (`GET /stats`)
//! and this module read from two independent stores that should stay in
//! rough agreement; neither is authoritative over the other.

use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::time::{Duration, Instant};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    /// Upstream requests made, by provider and outcome.
    pub static ref PROVIDER_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("provider_requests_total", "Total upstream requests made per provider")
            .namespace("gateway")
            .subsystem("provider"),
        &["provider", "status"]
    ).unwrap();

    /// Duration of a single upstream call.
    pub static ref PROVIDER_CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("provider_call_duration_seconds", "Duration of upstream provider calls in seconds")
            .namespace("gateway")
            .subsystem("provider")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 45.0]),
        &["provider"]
    ).unwrap();

    /// Cache outcome per request, by provider and cache source.
    pub static ref CACHE_OUTCOMES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("cache_outcomes_total", "Cache hit/miss outcomes per provider")
            .namespace("gateway")
            .subsystem("cache"),
        &["provider", "source"]
    ).unwrap();

    /// HTTP requests served, by route and status code.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_requests_total", "Total HTTP requests served")
            .namespace("gateway")
            .subsystem("http"),
        &["route", "status"]
    ).unwrap();

    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "Duration of HTTP requests in seconds")
            .namespace("gateway")
            .subsystem("http")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["route"]
    ).unwrap();

    /// Rows claimed by the background refresher per cycle.
    pub static ref REFRESHER_ITEMS_PROCESSED: IntCounterVec = IntCounterVec::new(
        Opts::new("refresher_items_processed_total", "Items processed by the background refresher")
            .namespace("gateway")
            .subsystem("refresher"),
        &["outcome"]
    ).unwrap();

    pub static ref POOL_ACTIVE_CONNECTIONS: IntGauge = IntGauge::with_opts(
        Opts::new("pool_active_connections", "Active Postgres pool connections")
            .namespace("gateway")
            .subsystem("db")
    ).unwrap();
}

/// Register every metric with [`REGISTRY`]. Called once at startup.
pub fn register_all() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(PROVIDER_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PROVIDER_CALL_DURATION.clone()))?;
    REGISTRY.register(Box::new(CACHE_OUTCOMES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(REFRESHER_ITEMS_PROCESSED.clone()))?;
    REGISTRY.register(Box::new(POOL_ACTIVE_CONNECTIONS.clone()))?;
    Ok(())
}

/// Render the current registry in Prometheus text exposition format.
pub fn export_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

pub struct ProviderMetrics;

impl ProviderMetrics {
    pub fn record_call_start(provider: &str) -> ProviderCallTimer {
        ProviderCallTimer { provider: provider.to_string(), start: Instant::now() }
    }

    pub fn record_cache_outcome(provider: &str, source: &str) {
        CACHE_OUTCOMES_TOTAL.with_label_values(&[provider, source]).inc();
    }
}

pub struct ProviderCallTimer {
    provider: String,
    start: Instant,
}

impl ProviderCallTimer {
    pub fn success(self) {
        PROVIDER_REQUESTS_TOTAL.with_label_values(&[&self.provider, "success"]).inc();
        PROVIDER_CALL_DURATION.with_label_values(&[&self.provider]).observe(self.start.elapsed().as_secs_f64());
    }

    pub fn failure(self) {
        PROVIDER_REQUESTS_TOTAL.with_label_values(&[&self.provider, "error"]).inc();
        PROVIDER_CALL_DURATION.with_label_values(&[&self.provider]).observe(self.start.elapsed().as_secs_f64());
    }
}

pub struct ApiMetrics;

impl ApiMetrics {
    pub fn record_request(route: &str, status_code: u16, duration: Duration) {
        HTTP_REQUESTS_TOTAL.with_label_values(&[route, &status_code.to_string()]).inc();
        HTTP_REQUEST_DURATION.with_label_values(&[route]).observe(duration.as_secs_f64());
    }
}

pub struct RefresherMetrics;

impl RefresherMetrics {
    pub fn record_outcome(outcome: &str) {
        REFRESHER_ITEMS_PROCESSED.with_label_values(&[outcome]).inc();
    }
}

pub fn update_pool_active_connections(count: i64) {
    POOL_ACTIVE_CONNECTIONS.set(count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_text_contains_registered_metric_names() {
        let _ = register_all();
        ProviderMetrics::record_call_start("googlebooks").success();
        let text = export_metrics().unwrap();
        assert!(text.contains("gateway_provider_requests_total"));
    }
}
