//! Background refresher (component H).
//!
//! A struct holding its dependencies and config, a `start()` that spawns
//! the interval loop, and a `run_once()` the tests call directly instead
//! of waiting on a real timer.

use crate::db::storage::PgStorage;
use gateway_core::cache::ItemCacheStore;
use gateway_core::config::RefresherConfig;
use gateway_core::registry::ProviderRegistry;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct BackgroundRefresher {
    storage: Arc<PgStorage>,
    registry: Arc<ProviderRegistry>,
    config: RefresherConfig,
}

impl BackgroundRefresher {
    pub fn new(storage: Arc<PgStorage>, registry: Arc<ProviderRegistry>, config: RefresherConfig) -> Self {
        Self { storage, registry, config }
    }

    /// Spawn the interval loop. The returned handle is aborted at
    /// graceful shutdown.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.check_interval);
            loop {
                interval.tick().await;
                self.run_once().await;
            }
        })
    }

    /// One refresh cycle: pick up to `max_refresh_per_cycle` expiring,
    /// popular items and re-fetch each through the owning provider with
    /// `force_refresh=true`. Every failure is logged; the cycle never
    /// aborts early.
    pub async fn run_once(&self) {
        let candidates = match self.storage.items_to_refresh(self.config.max_refresh_per_cycle).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list items_to_refresh, skipping cycle");
                return;
            }
        };

        for item in candidates {
            let Ok(provider) = self.registry.client(&item.source) else {
                tracing::warn!(source = %item.source, "refresh candidate references unknown provider, skipping");
                continue;
            };

            let result = provider
                .get_details(&item.source_id, &gateway_core::provider::FetchOpts { force_refresh: true, ..Default::default() })
                .await;

            match result {
                Ok(Some(payload)) => {
                    if let Err(e) = self
                        .storage
                        .save_item(
                            &item.source,
                            &item.source_id,
                            &item.item_type,
                            &item.name,
                            &payload,
                            gateway_core::cache::SaveItemOpts::default(),
                        )
                        .await
                    {
                        tracing::warn!(error = %e, source = %item.source, "refresh save_item failed");
                    }
                }
                Ok(None) => {
                    tracing::debug!(source = %item.source, id = %item.source_id, "refresh found item gone upstream");
                }
                Err(e) => {
                    tracing::warn!(error = %e, source = %item.source, id = %item.source_id, "refresh fetch failed");
                }
            }

            tokio::time::sleep(self.config.refresh_delay).await;
        }
    }
}
