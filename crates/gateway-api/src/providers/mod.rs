//! Concrete provider implementations and the registry wiring that
//! assembles them into a [`ProviderRegistry`] at startup.
//!
//! Only a handful of representative providers are implemented here (one
//! plain JSON API with no key, one JSON API requiring a key, one scraped
//! through the anti-bot proxy); the remaining upstream sources follow
//! the same three shapes against their own endpoints.

pub mod googlebooks;
pub mod lego;
pub mod tmdb;

use crate::config::AppConfig;
use crate::fetch::{FsrProxyBackend, HttpFetcher};
use gateway_core::cache::resolve_ttl;
use gateway_core::provider::ProviderKind;
use gateway_core::registry::{ProviderDescriptor, ProviderRegistry};
use std::sync::Arc;

/// Build the full provider registry from configuration. Called once at
/// startup by `gateway-app`.
pub fn build_registry(config: &AppConfig, fetcher: Arc<HttpFetcher>) -> gateway_core::error::Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    registry.register(
        ProviderDescriptor::new("googlebooks", "Google Books", ProviderKind::Json).with_ttl(resolve_ttl("googlebooks")),
        Arc::new(googlebooks::GoogleBooksProvider::new(
            fetcher.clone(),
            config.api_key_for("googlebooks").map(str::to_string),
        )),
    );

    if let Some(api_key) = config.api_key_for("tmdb") {
        registry.register(
            ProviderDescriptor::new("tmdb", "TMDB", ProviderKind::Json)
                .with_ttl(resolve_ttl("tmdb"))
                .needs_api_key(true),
            Arc::new(tmdb::TmdbProvider::new(fetcher.clone(), api_key.to_string())),
        );
    } else {
        tracing::warn!("TMDB_API_KEY not set, tmdb provider not registered");
    }

    if let Some(fsr_base) = &config.fsr_base {
        let proxy = Arc::new(FsrProxyBackend::new(fsr_base.clone())?);
        registry.register(
            ProviderDescriptor::new("lego", "LEGO", ProviderKind::Scraping)
                .with_ttl(resolve_ttl("lego"))
                .needs_proxy(true),
            Arc::new(lego::LegoProvider::new(proxy)),
        );
    } else {
        tracing::warn!("FSR_BASE not set, lego provider not registered");
    }

    Ok(registry)
}
