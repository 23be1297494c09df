//! Multi-source fan-out coordinator (component G).
//!
//! Settles every branch independently: one provider failing never cancels
//! the others, and the aggregate always resolves rather than propagating
//! a single branch's error, the same settle-everything style used for
//! parallel, independently-failing branches in a node graph.

use futures_util::future::join_all;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;

type BoxedBranch = Pin<Box<dyn Future<Output = (String, Result<Value, String>)> + Send>>;

/// Run every `(tag, future)` branch to completion and collect the results
/// keyed by tag into `{ sources: { tag: envelope | {error} } }`.
pub async fn settle_all(branches: Vec<(String, BoxedBranch)>) -> Value {
    let futures: Vec<BoxedBranch> = branches.into_iter().map(|(_, fut)| fut).collect();
    let results = join_all(futures).await;

    let mut sources = serde_json::Map::new();
    for (tag, result) in results {
        match result {
            Ok(value) => {
                sources.insert(tag, value);
            }
            Err(message) => {
                sources.insert(tag, json!({ "error": message }));
            }
        }
    }

    json!({ "sources": Value::Object(sources) })
}

/// Wrap a fallible branch future so a provider error becomes a string
/// rather than short-circuiting the whole fan-out.
pub fn branch<F>(tag: impl Into<String>, future: F) -> (String, BoxedBranch)
where
    F: Future<Output = Result<Value, gateway_core::error::GatewayError>> + Send + 'static,
{
    let tag = tag.into();
    let boxed: BoxedBranch = Box::pin(async move {
        let result = future.await.map_err(|e| e.to_string());
        (tag.clone(), result)
    });
    (tag, boxed)
}

/// Whether a fan-out result should be cached: never if every branch
/// failed.
pub fn should_cache(envelope: &Value) -> bool {
    envelope
        .get("sources")
        .and_then(|v| v.as_object())
        .map(|sources| sources.values().any(|v| v.get("error").is_none()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::error::GatewayError;

    #[tokio::test]
    async fn settle_all_collects_both_success_and_failure_branches() {
        let branches = vec![
            branch("googlebooks", async { Ok(json!({"title": "Dune"})) }),
            branch("openlibrary", async {
                Err::<Value, GatewayError>(GatewayError::UpstreamUnavailable {
                    provider: "openlibrary".into(),
                    message: "timeout".into(),
                })
            }),
        ];

        let result = settle_all(branches).await;
        let sources = result["sources"].as_object().unwrap();
        assert_eq!(sources["googlebooks"]["title"], "Dune");
        assert!(sources["openlibrary"]["error"].is_string());
    }

    #[test]
    fn should_cache_is_false_when_every_branch_failed() {
        let envelope = json!({"sources": {"a": {"error": "x"}, "b": {"error": "y"}}});
        assert!(!should_cache(&envelope));
    }

    #[test]
    fn should_cache_is_true_when_at_least_one_branch_succeeded() {
        let envelope = json!({"sources": {"a": {"error": "x"}, "b": {"title": "ok"}}});
        assert!(should_cache(&envelope));
    }
}
