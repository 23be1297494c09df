//! `GET /health` and `GET /health/detailed` — pool stats, process uptime,
//! and per-provider counters.

use crate::api::startup::get_uptime_seconds;
use crate::db::ConnectionPool;
use actix_web::{web, HttpResponse, Result};
use gateway_core::registry::ProviderRegistry;
use gateway_core::telemetry::Telemetry;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::System;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub database: ComponentHealth,
    pub memory: ComponentHealth,
    pub providers: ComponentHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedHealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
    pub provider_counters: serde_json::Value,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "System is healthy or degraded", body = HealthStatus),
        (status = 503, description = "System is unhealthy", body = HealthStatus)
    )
)]
pub async fn health_check(
    pool: web::Data<Arc<ConnectionPool>>,
    registry: web::Data<Arc<ProviderRegistry>>,
) -> Result<HttpResponse> {
    let mut overall_status = "healthy";

    let db_health = check_database(&pool).await;
    if db_health.status != "healthy" {
        overall_status = "degraded";
    }

    let memory_health = check_memory();
    if memory_health.status == "unhealthy" {
        overall_status = "unhealthy";
    }

    let providers_health = check_providers(&registry);

    let health_status = HealthStatus {
        status: overall_status.to_string(),
        timestamp: now_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_health,
            memory: memory_health,
            providers: providers_health,
        },
    };

    let status_code = if overall_status == "unhealthy" { 503 } else { 200 };
    Ok(HttpResponse::build(actix_web::http::StatusCode::from_u16(status_code).unwrap()).json(health_status))
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "Health",
    responses(
        (status = 200, description = "Detailed health information", body = DetailedHealthStatus)
    )
)]
pub async fn detailed_health_check(
    pool: web::Data<Arc<ConnectionPool>>,
    registry: web::Data<Arc<ProviderRegistry>>,
    telemetry: web::Data<Arc<Telemetry>>,
) -> Result<HttpResponse> {
    let mut overall_status = "healthy";

    let db_health = check_database(&pool).await;
    if db_health.status != "healthy" {
        overall_status = "degraded";
    }

    let memory_health = check_memory();
    if memory_health.status == "unhealthy" {
        overall_status = "unhealthy";
    }

    let providers_health = check_providers(&registry);

    let detailed_status = DetailedHealthStatus {
        status: overall_status.to_string(),
        timestamp: now_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: get_uptime_seconds(),
        checks: HealthChecks {
            database: db_health,
            memory: memory_health,
            providers: providers_health,
        },
        provider_counters: serde_json::to_value(telemetry.snapshot_all()).unwrap_or_default(),
    };

    Ok(HttpResponse::Ok().json(detailed_status))
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

async fn check_database(pool: &ConnectionPool) -> ComponentHealth {
    match pool.test_connectivity().await {
        Ok(()) => {
            let metrics = pool.metrics().await;
            ComponentHealth {
                status: "healthy".to_string(),
                message: Some("database connection successful".to_string()),
                details: Some(serde_json::json!({
                    "total_connections": metrics.total_connections,
                    "idle_connections": metrics.idle_connections,
                })),
            }
        }
        Err(e) => ComponentHealth {
            status: "unhealthy".to_string(),
            message: Some(format!("database check failed: {}", e)),
            details: None,
        },
    }
}

fn check_memory() -> ComponentHealth {
    let mut sys = System::new_all();
    sys.refresh_memory();

    let total_memory = sys.total_memory();
    let free_memory = sys.free_memory();
    let usage_percent = ((total_memory - free_memory) as f32 / total_memory as f32) * 100.0;

    let (status, message) = if usage_percent > 90.0 {
        ("unhealthy", Some("memory usage critical (>90%)".to_string()))
    } else if usage_percent > 80.0 {
        ("degraded", Some("memory usage high (>80%)".to_string()))
    } else {
        ("healthy", None)
    };

    ComponentHealth {
        status: status.to_string(),
        message,
        details: Some(serde_json::json!({
            "total_mb": total_memory / 1024,
            "free_mb": free_memory / 1024,
            "usage_percent": usage_percent,
        })),
    }
}

fn check_providers(registry: &ProviderRegistry) -> ComponentHealth {
    if registry.is_empty() {
        return ComponentHealth {
            status: "unhealthy".to_string(),
            message: Some("no providers registered".to_string()),
            details: None,
        };
    }
    ComponentHealth {
        status: "healthy".to_string(),
        message: None,
        details: Some(serde_json::json!({ "registered": registry.len() })),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/health/detailed").route(web::get().to(detailed_health_check)));
}
