//! Cache Gate Module
//!
//! The layer application code calls instead of touching [`Cache`] directly.
//! It honours the global caching switch, records hit/miss/set events and
//! offers a typed JSON convenience on top of the byte-oriented engine.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::keys::canonical_json;
use crate::cache::stats::{self, events, StatsTable};
use crate::cache::{registry, CacheRegistry};
use crate::error::{CacheError, Result};

// == Cache Gate ==
#[derive(Debug, Clone)]
pub struct CacheGate {
    registry: Arc<CacheRegistry>,
    stats: Arc<StatsTable>,
}

impl CacheGate {
    pub fn new(registry: Arc<CacheRegistry>, stats: Arc<StatsTable>) -> Self {
        Self { registry, stats }
    }

    /// Gate over the process-wide registry and stats table.
    pub fn global() -> Self {
        Self::new(registry::global(), stats::global())
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<StatsTable> {
        &self.stats
    }

    // == Get Or Set ==
    /// Serves `key` from `namespace`, running `factory` on a miss.
    ///
    /// With caching disabled this is exactly `factory().await`: the store is
    /// neither read nor written and no events are recorded.
    pub async fn get_or_set<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        factory: F,
        ttl_seconds: Option<u64>,
    ) -> Result<Bytes>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Bytes>> + Send + 'static,
    {
        if !self.registry.is_enabled() {
            debug!(namespace, key, "caching disabled, calling factory directly");
            return factory()
                .await
                .map_err(|err| CacheError::factory(key, err));
        }

        let cache = self.registry.get_cache(namespace)?;
        if let Some(value) = cache.get(key) {
            self.stats.increment(namespace, events::HIT);
            return Ok(value);
        }
        self.stats.increment(namespace, events::MISS);

        let stats = Arc::clone(&self.stats);
        let owned_namespace = namespace.to_string();
        cache
            .get_or_set(
                key,
                move || async move {
                    let outcome = factory().await;
                    let event = if outcome.is_ok() {
                        events::SET
                    } else {
                        events::ERROR
                    };
                    stats.increment(&owned_namespace, event);
                    outcome
                },
                ttl_seconds,
            )
            .await
    }

    // == Get Or Set JSON ==
    /// Typed variant of [`get_or_set`](Self::get_or_set).
    ///
    /// The factory's value is stored as canonical JSON and decoded again on
    /// every call, so the engine only ever sees bytes.
    pub async fn get_or_set_json<T, F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        factory: F,
        ttl_seconds: Option<u64>,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let bytes = self
            .get_or_set(
                namespace,
                key,
                move || async move {
                    let value = factory().await?;
                    anyhow::Ok(Bytes::from(canonical_json(&value)?))
                },
                ttl_seconds,
            )
            .await?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn gate(enabled: bool) -> CacheGate {
        let registry = CacheRegistry::new(Config::default().with_enabled(enabled)).unwrap();
        CacheGate::new(Arc::new(registry), Arc::new(StatsTable::new()))
    }

    fn counted(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> futures::future::Ready<anyhow::Result<Bytes>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(Bytes::from_static(b"payload")))
        }
    }

    #[tokio::test]
    async fn test_records_miss_set_then_hit() {
        let gate = gate(true);
        let calls = Arc::new(AtomicUsize::new(0));

        gate.get_or_set("http", "k", counted(&calls), None).await.unwrap();
        gate.get_or_set("http", "k", counted(&calls), None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.stats().count("http", events::MISS), 1);
        assert_eq!(gate.stats().count("http", events::SET), 1);
        assert_eq!(gate.stats().count("http", events::HIT), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_calls_factory() {
        let gate = gate(false);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = gate.get_or_set("http", "k", counted(&calls), None).await.unwrap();
        let second = gate.get_or_set("http", "k", counted(&calls), None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(gate.registry().namespaces().is_empty());
        assert!(gate.stats().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_counted_and_not_cached() {
        let gate = gate(true);

        let result = gate
            .get_or_set(
                "llm",
                "k",
                || async { Err::<Bytes, _>(anyhow::anyhow!("rate limited")) },
                None,
            )
            .await;

        assert_eq!(result.unwrap_err().to_string(), "rate limited");
        assert_eq!(gate.stats().count("llm", events::ERROR), 1);
        assert_eq!(gate.stats().count("llm", events::SET), 0);
        assert!(gate.registry().get_cache("llm").unwrap().is_empty());
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Completion {
        model: String,
        text: String,
    }

    #[tokio::test]
    async fn test_json_round_trip_through_engine() {
        let gate = gate(true);
        let expected = Completion {
            model: "m".to_string(),
            text: "hello".to_string(),
        };

        let produced = expected.clone();
        let first: Completion = gate
            .get_or_set_json("llm", "c1", move || async move { anyhow::Ok(produced) }, None)
            .await
            .unwrap();
        let second: Completion = gate
            .get_or_set_json(
                "llm",
                "c1",
                || async { Err::<Completion, _>(anyhow::anyhow!("must not run")) },
                None,
            )
            .await
            .unwrap();

        assert_eq!(first, expected);
        assert_eq!(second, expected);

        let raw = gate.registry().get_cache("llm").unwrap().get("c1").unwrap();
        assert_eq!(&raw[..], br#"{"model":"m","text":"hello"}"#);
    }
}
