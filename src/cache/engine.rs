//! Cache Module
//!
//! Combines a bounded store, a namespace policy and a single-flight
//! coordinator into the `get_or_set` operation.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

use crate::cache::{BoundedStore, CachePolicy, SingleFlight};
use crate::error::Result;

// == Cache ==
/// A namespace's cache: one store, one policy, one single-flight registry.
#[derive(Debug)]
pub struct Cache {
    policy: CachePolicy,
    store: Arc<BoundedStore>,
    flights: SingleFlight,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache sized by `policy`.
    pub fn new(policy: CachePolicy) -> Result<Self> {
        let store = BoundedStore::new(policy.max_entries())?;
        Ok(Self {
            policy,
            store: Arc::new(store),
            flights: SingleFlight::new(),
        })
    }

    // == Get Or Set ==
    /// Returns the cached payload for `key`, populating it with `factory` on
    /// a miss.
    ///
    /// A hit returns immediately without touching `factory` or the
    /// single-flight registry. On a miss, concurrent callers for the same key
    /// share one execution of `factory`; a successful result is written back
    /// with `ttl_seconds` or the policy's default TTL. A failed population
    /// leaves the store exactly as it was and reaches every waiter as the same
    /// [`CacheError::Factory`](crate::error::CacheError::Factory).
    pub async fn get_or_set<F, Fut>(
        &self,
        key: &str,
        factory: F,
        ttl_seconds: Option<u64>,
    ) -> Result<Bytes>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Bytes>> + Send + 'static,
    {
        if let Some(value) = self.store.get(key) {
            trace!(namespace = self.policy.namespace(), key, "cache hit");
            return Ok(value);
        }

        let store = Arc::clone(&self.store);
        let ttl = ttl_seconds.unwrap_or(self.policy.default_ttl());
        let owned_key = key.to_string();

        // Lock order: single-flight registry, then store
        self.flights
            .run_unless_cached(
                key,
                || self.store.get(key),
                move || async move {
                    let value = factory().await?;
                    store.set(&owned_key, value.clone(), ttl);
                    anyhow::Ok(value)
                },
            )
            .await
    }

    // == Accessors ==
    /// Reads the store directly; never populates.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.store.get(key)
    }

    /// Drops the entry for `key`, returning whether one existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.store.remove(key)
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Number of populations currently running for this namespace.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }
}
