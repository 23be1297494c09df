//! HTTP endpoints: the provider-facing routes, health checks, and the
//! telemetry/system endpoints, plus the request middleware and shared
//! validation/envelope helpers they're built from.

use actix_web::web;

pub mod envelope;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod startup;
pub mod telemetry;
pub mod validation;

/// Mount every route under the server's root scope.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    health::config(cfg);
    telemetry::config(cfg);
    handlers::config(cfg);
}
