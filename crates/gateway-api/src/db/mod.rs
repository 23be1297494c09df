//! Storage layer: connection pooling, Diesel schema/row types, and the
//! concrete `ItemCacheStore`/`SearchCacheStore` implementation against
//! Postgres (components A, C, D).

pub mod connection_pool;
pub mod models;
pub mod schema;
pub mod storage;

pub use connection_pool::{ConnectionPool, PgPool, PoolMetrics, ServicePoolConfig};
pub use storage::PgStorage;

diesel_migrations::embed_migrations!("migrations");

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use gateway_core::error::GatewayError;

/// Run pending migrations against a fresh connection to `database_url`.
/// Called once at startup before the HTTP listener binds.
pub fn run_migrations(database_url: &str) -> Result<(), GatewayError> {
    let mut conn = PgConnection::establish(database_url).map_err(|e| GatewayError::Cache {
        message: format!("failed to connect for migrations: {e}"),
    })?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| GatewayError::Cache {
            message: format!("migration run failed: {e}"),
        })?;
    Ok(())
}
