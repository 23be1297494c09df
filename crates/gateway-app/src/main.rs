use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenvy::dotenv;
use gateway_api::api::middleware::RequestTelemetryMiddleware;
use gateway_api::db::PgStorage;
use gateway_api::{api, config::AppConfig, db, monitoring, providers};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    monitoring::logging::init_logging();
    let _ = monitoring::metrics::register_all();

    let config = AppConfig::new()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("configuration error: {e}")))?;

    db::run_migrations(&config.database_url)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("migration error: {e}")))?;

    let server_address = config.server_address();
    let cache_mode = config.cache_mode;
    let pool = config.pool.clone();
    let storage = Arc::new(PgStorage::new(pool.clone()));
    let telemetry = Arc::new(gateway_core::telemetry::Telemetry::new());

    let fetcher = Arc::new(
        gateway_api::fetch::HttpFetcher::new(config.max_retries, config.provider_min_intervals())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("fetcher init error: {e}")))?,
    );
    let registry = Arc::new(
        providers::build_registry(&config, fetcher)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("provider registry error: {e}")))?,
    );

    let refresher = Arc::new(gateway_api::refresher::BackgroundRefresher::new(
        storage.clone(),
        registry.clone(),
        config.refresher.clone(),
    ));
    let refresher_handle = refresher.start();

    info!(address = %server_address, "starting gateway");

    let storage_data = web::Data::new(storage);
    let registry_data = web::Data::new(registry);
    let telemetry_data = web::Data::new(telemetry);
    let pool_data = web::Data::new(pool);
    let cache_mode_data = web::Data::new(cache_mode);

    let server = HttpServer::new(move || {
        let cors = Cors::default().allow_any_origin().allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(storage_data.clone())
            .app_data(registry_data.clone())
            .app_data(telemetry_data.clone())
            .app_data(pool_data.clone())
            .app_data(cache_mode_data.clone())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .wrap(RequestTelemetryMiddleware)
            .configure(api::init_routes)
    })
    .shutdown_timeout(10)
    .bind(server_address)?
    .run();

    let result = server.await;
    refresher_handle.abort();
    result
}
