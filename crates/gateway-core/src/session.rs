//! The anti-bot scraping session singleton (component F).
//!
//! Scraping providers are fetched through an external proxy service that
//! issues a session id once a bot challenge has been solved. That id is a
//! process-wide singleton: concurrent callers share it, its creation is
//! serialized so only one challenge is solved at a time, and it is rotated
//! whenever the proxy rejects it.

use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Opaque session identifier handed back by the proxy service.
pub type SessionHandle = String;

/// The two proxy-service operations the session manager orchestrates.
/// Implemented in `gateway-api` against the configured `FSR_BASE` endpoint;
/// kept as a trait here so the ensure/destroy/rotate state machine can be
/// unit-tested without a network call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProxySessionBackend: Send + Sync {
    async fn create_session(&self) -> Result<SessionHandle>;
    async fn destroy_session(&self, id: &SessionHandle) -> Result<()>;
}

/// Process-wide proxy session, guarded so at most one `ensure` is ever
/// in flight.
pub struct ScrapingSessionManager<B: ProxySessionBackend> {
    backend: B,
    current: Mutex<Option<SessionHandle>>,
}

impl<B: ProxySessionBackend> ScrapingSessionManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: Mutex::new(None),
        }
    }

    /// Returns the current session, creating one if none exists. Callers
    /// that race here share the single in-flight creation rather than each
    /// solving their own challenge.
    pub async fn ensure_session(&self) -> Result<SessionHandle> {
        let mut guard = self.current.lock().await;
        if let Some(id) = guard.as_ref() {
            return Ok(id.clone());
        }
        let id = self.backend.create_session().await?;
        *guard = Some(id.clone());
        Ok(id)
    }

    /// Destroys the session on a proxy-reported failure so the next
    /// `ensure_session` call re-creates it.
    pub async fn cleanup_session(&self) -> Result<()> {
        let mut guard = self.current.lock().await;
        if let Some(id) = guard.take() {
            self.backend.destroy_session(&id).await?;
        }
        Ok(())
    }

    /// Explicit teardown at graceful shutdown.
    pub async fn destroy_session(&self) -> Result<()> {
        self.cleanup_session().await
    }

    /// Run `f` with the current session, rotating once and retrying on a
    /// session-scoped error before giving up.
    pub async fn with_session<'a, F, Fut, T>(&'a self, f: F) -> Result<T>
    where
        F: Fn(SessionHandle) -> Fut,
        Fut: std::future::Future<Output = Result<T>> + 'a,
    {
        let id = self.ensure_session().await?;
        match f(id).await {
            Ok(value) => Ok(value),
            Err(GatewayError::Session { message }) => {
                tracing::warn!(error = %message, "scraping session rejected, rotating");
                self.cleanup_session().await?;
                let new_id = self.ensure_session().await?;
                f(new_id).await
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingBackend {
        created: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProxySessionBackend for CountingBackend {
        async fn create_session(&self) -> Result<SessionHandle> {
            let n = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(format!("session-{n}"))
        }

        async fn destroy_session(&self, _id: &SessionHandle) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn ensure_session_creates_once_and_reuses() {
        let created = Arc::new(AtomicUsize::new(0));
        let manager = ScrapingSessionManager::new(CountingBackend { created: created.clone() });

        let first = manager.ensure_session().await.unwrap();
        let second = manager.ensure_session().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cleanup_then_ensure_creates_a_new_session() {
        let created = Arc::new(AtomicUsize::new(0));
        let manager = ScrapingSessionManager::new(CountingBackend { created: created.clone() });

        let first = manager.ensure_session().await.unwrap();
        manager.cleanup_session().await.unwrap();
        let second = manager.ensure_session().await.unwrap();

        assert_ne!(first, second);
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn with_session_rotates_once_on_session_error() {
        let created = Arc::new(AtomicUsize::new(0));
        let manager = ScrapingSessionManager::new(CountingBackend { created: created.clone() });

        let attempt = AtomicUsize::new(0);
        let result = manager
            .with_session(|id| {
                let attempt_no = attempt.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt_no == 0 {
                        Err(GatewayError::Session { message: "expired".into() })
                    } else {
                        Ok(id)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "session-1");
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }
}
