//! The per-provider descriptor table.
//!
//! The source system dispatched on provider name with a `switch(source)`
//! statement scattered across handlers. Here every provider is registered
//! once at startup as a [`ProviderDescriptor`] plus its [`ProviderClient`]
//! implementation; everything else — handlers, the fetch manager, the
//! background refresher — looks the provider up by tag instead of matching
//! on a string.

use crate::error::{GatewayError, Result};
use crate::provider::{ProviderClient, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Static facts about a provider needed outside the client trait itself:
/// how often it may be hit, how long its items live in cache, and whether
/// it needs credentials or the anti-bot proxy.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub tag: String,
    pub display_name: String,
    pub kind: ProviderKind,
    /// Minimum spacing between two requests to this provider, if any.
    pub min_interval: Option<Duration>,
    /// Default item TTL for this provider (overridable per call).
    pub ttl: Duration,
    pub needs_api_key: bool,
    pub needs_proxy: bool,
}

impl ProviderDescriptor {
    pub fn new(tag: impl Into<String>, display_name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            tag: tag.into(),
            display_name: display_name.into(),
            kind,
            min_interval: None,
            ttl: Duration::from_secs(30 * 24 * 3600),
            needs_api_key: false,
            needs_proxy: false,
        }
    }

    pub fn with_min_interval(mut self, d: Duration) -> Self {
        self.min_interval = Some(d);
        self
    }

    pub fn with_ttl(mut self, d: Duration) -> Self {
        self.ttl = d;
        self
    }

    pub fn needs_api_key(mut self, v: bool) -> Self {
        self.needs_api_key = v;
        self
    }

    pub fn needs_proxy(mut self, v: bool) -> Self {
        self.needs_proxy = v;
        self
    }
}

struct Entry {
    descriptor: ProviderDescriptor,
    client: Arc<dyn ProviderClient>,
}

/// Registry of every provider the gateway can route to, built once at
/// startup by `gateway-app` and shared as `web::Data<ProviderRegistry>`.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: HashMap<String, Entry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Panics on duplicate tag registration — that is
    /// a startup-time programming error, never a runtime condition.
    pub fn register(&mut self, descriptor: ProviderDescriptor, client: Arc<dyn ProviderClient>) {
        let tag = descriptor.tag.clone();
        if self.entries.contains_key(&tag) {
            panic!("provider '{}' registered twice", tag);
        }
        self.entries.insert(tag, Entry { descriptor, client });
    }

    pub fn client(&self, tag: &str) -> Result<Arc<dyn ProviderClient>> {
        self.entries
            .get(tag)
            .map(|e| e.client.clone())
            .ok_or_else(|| GatewayError::Validation {
                message: format!("unknown provider: {}", tag),
            })
    }

    pub fn descriptor(&self, tag: &str) -> Result<&ProviderDescriptor> {
        self.entries
            .get(tag)
            .map(|e| &e.descriptor)
            .ok_or_else(|| GatewayError::Validation {
                message: format!("unknown provider: {}", tag),
            })
    }

    pub fn tags(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FetchOpts, ProviderSearchResult, SearchOpts};
    use async_trait::async_trait;
    use serde_json::Value;

    struct StubProvider(&'static str);

    #[async_trait]
    impl ProviderClient for StubProvider {
        fn tag(&self) -> &str {
            self.0
        }

        async fn search(&self, _query: &str, _opts: &SearchOpts) -> Result<ProviderSearchResult> {
            Ok(ProviderSearchResult::empty())
        }

        async fn get_details(&self, _id: &str, _opts: &FetchOpts) -> Result<Option<Value>> {
            Ok(None)
        }
    }

    #[test]
    fn lookup_unknown_provider_is_a_validation_error() {
        let registry = ProviderRegistry::new();
        let err = registry.client("nope").unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[test]
    fn registered_provider_is_retrievable_by_tag() {
        let mut registry = ProviderRegistry::new();
        let descriptor = ProviderDescriptor::new("stub", "Stub", ProviderKind::Json)
            .with_min_interval(Duration::from_millis(250))
            .needs_api_key(true);
        registry.register(descriptor, Arc::new(StubProvider("stub")));

        assert_eq!(registry.len(), 1);
        assert!(registry.client("stub").is_ok());
        assert_eq!(registry.descriptor("stub").unwrap().tag, "stub");
        assert!(registry.descriptor("stub").unwrap().needs_api_key);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut registry = ProviderRegistry::new();
        registry.register(
            ProviderDescriptor::new("stub", "Stub", ProviderKind::Json),
            Arc::new(StubProvider("stub")),
        );
        registry.register(
            ProviderDescriptor::new("stub", "Stub", ProviderKind::Json),
            Arc::new(StubProvider("stub")),
        );
    }
}
