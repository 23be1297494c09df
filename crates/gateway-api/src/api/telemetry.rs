//! Telemetry read endpoint and the two system reset endpoints

use crate::db::connection_pool::ConnectionPool;
use crate::db::storage;
use actix_web::{web, HttpResponse};
use gateway_core::telemetry::Telemetry;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct StatsResponse {
    sources: HashMap<String, Value>,
    today: storage::DailyTotals,
}

/// `GET /stats`: current process counters per provider plus today's
/// persisted totals across all providers.
pub async fn stats(telemetry: web::Data<Arc<Telemetry>>, pool: web::Data<Arc<ConnectionPool>>) -> HttpResponse {
    let snapshot = telemetry.snapshot_all();
    let sources = snapshot
        .into_iter()
        .map(|(source, counters)| {
            (
                source,
                serde_json::json!({
                    "requests": counters.requests,
                    "errors": counters.errors,
                    "cached": counters.cached,
                    "avgApiTimeMs": counters.avg_api_time_ms(),
                }),
            )
        })
        .collect();

    let today = storage::today_stats_totals(&pool).await.unwrap_or_default();

    HttpResponse::Ok().json(StatsResponse { sources, today })
}

/// `GET /version`.
pub async fn version() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// `DELETE /metrics`: resets the in-process counters. Does not touch the
/// persisted `stats` rows.
pub async fn reset_metrics(telemetry: web::Data<Arc<Telemetry>>) -> HttpResponse {
    telemetry.reset();
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

/// `DELETE /cache`: the gateway has no in-memory cache layer of its own
/// (the database is the only cache tier), so this is a no-op that exists
/// only so clients scripted against the interface get a 200 rather than
/// a 404.
pub async fn flush_cache() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "flushed": 0 }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/stats").route(web::get().to(stats)));
    cfg.service(web::resource("/version").route(web::get().to(version)));
    cfg.service(web::resource("/metrics").route(web::delete().to(reset_metrics)));
    cfg.service(web::resource("/cache").route(web::delete().to(flush_cache)));
}
