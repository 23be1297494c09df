//! The gateway's single Postgres connection pool.
//!
//! Simplified from a multi-tenant/multi-service pool manager down to the
//! single pool the gateway actually needs: one `DATABASE_URL`, one
//! `ServicePoolConfig`, metrics tracked the same way.

use diesel::pg::PgConnection;
use diesel::r2d2::{Builder, ConnectionManager, Pool, PooledConnection};
use gateway_core::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Pool sizing/timeout configuration, loaded from env by `AppConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePoolConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub test_on_checkout: bool,
}

impl ServicePoolConfig {
    pub fn new(database_url: String) -> Self {
        Self {
            database_url,
            max_connections: 20,
            min_connections: 5,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
            test_on_checkout: true,
        }
    }

    pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_connections = min;
        self.max_connections = max;
        self
    }
}

/// Point-in-time pool health, surfaced by `GET /health`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PoolMetrics {
    pub total_connections: u32,
    pub idle_connections: u32,
    pub active_connections: u32,
    pub wait_count: u64,
    pub wait_time_ms: u64,
    pub timeout_count: u64,
    pub error_count: u64,
}

pub struct ConnectionPool {
    pool: Arc<PgPool>,
    config: ServicePoolConfig,
    metrics: Arc<RwLock<PoolMetrics>>,
}

impl ConnectionPool {
    pub fn new(config: ServicePoolConfig) -> Result<Self, GatewayError> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let mut builder = Builder::new()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(config.connection_timeout)
            .test_on_check_out(config.test_on_checkout);

        if let Some(idle_timeout) = config.idle_timeout {
            builder = builder.idle_timeout(Some(idle_timeout));
        }
        if let Some(max_lifetime) = config.max_lifetime {
            builder = builder.max_lifetime(Some(max_lifetime));
        }

        let pool = builder.build(manager).map_err(|e| GatewayError::Cache {
            message: format!("failed to create connection pool: {e}"),
        })?;

        Ok(Self {
            pool: Arc::new(pool),
            config,
            metrics: Arc::new(RwLock::new(PoolMetrics::default())),
        })
    }

    pub async fn get_connection(&self) -> Result<PgPooledConnection, GatewayError> {
        let start = std::time::Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                let elapsed = start.elapsed().as_millis() as u64;
                let mut metrics = self.metrics.write().await;
                metrics.wait_count += 1;
                metrics.wait_time_ms += elapsed;
                Ok(conn)
            }
            Err(e) => {
                let mut metrics = self.metrics.write().await;
                if e.to_string().contains("timeout") {
                    metrics.timeout_count += 1;
                } else {
                    metrics.error_count += 1;
                }
                Err(GatewayError::Cache {
                    message: format!("failed to get connection: {e}"),
                })
            }
        }
    }

    pub async fn metrics(&self) -> PoolMetrics {
        let state = self.pool.state();
        let mut metrics = self.metrics.write().await;
        metrics.total_connections = state.connections;
        metrics.idle_connections = state.idle_connections;
        metrics.active_connections = state.connections - state.idle_connections;
        metrics.clone()
    }

    pub fn config(&self) -> &ServicePoolConfig {
        &self.config
    }

    pub async fn test_connectivity(&self) -> Result<(), GatewayError> {
        use diesel::RunQueryDsl;
        let mut conn = self.get_connection().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map_err(|e| GatewayError::Cache {
                message: format!("connectivity test failed: {e}"),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_pool_config_defaults() {
        let config = ServicePoolConfig::new("postgresql://localhost/test".to_string())
            .with_pool_size(10, 50);

        assert_eq!(config.max_connections, 50);
        assert_eq!(config.min_connections, 10);
    }

    #[test]
    fn pool_metrics_default_is_zeroed() {
        let metrics = PoolMetrics::default();
        assert_eq!(metrics.total_connections, 0);
        assert_eq!(metrics.error_count, 0);
    }
}
