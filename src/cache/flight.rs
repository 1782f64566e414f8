//! Single-Flight Module
//!
//! Deduplicates concurrent population of the same key within one process.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

/// A population shared by every caller that asked for the same key.
type Flight = Shared<BoxFuture<'static, Result<Bytes>>>;

type Registry = Arc<Mutex<HashMap<String, Flight>>>;

// == Single Flight ==
/// Registry of in-flight populations keyed by cache key.
///
/// The first caller for a key spawns the factory on the tokio runtime and
/// registers a shared handle to its result; later callers for the same key
/// await that handle instead of running their own factory. Because the
/// factory runs on its own task, dropping any waiter (including the first)
/// never cancels it.
///
/// Must be driven from within a tokio runtime.
#[derive(Default)]
pub struct SingleFlight {
    in_flight: Registry,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `factory` for `key` unless a run is already in flight, in which
    /// case its outcome is awaited and `factory` is dropped unused.
    ///
    /// Every waiter of one run receives the same value or the same
    /// [`CacheError::Factory`]. The registration is removed before the
    /// outcome is released, so a call made after completion starts afresh.
    pub async fn run<F, Fut>(&self, key: &str, factory: F) -> Result<Bytes>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Bytes>> + Send + 'static,
    {
        self.run_unless_cached(key, || None, factory).await
    }

    /// Like [`run`](Self::run), but when no run is in flight `cached` is
    /// consulted first, under the registry lock, and a value it returns is
    /// served without starting a population.
    ///
    /// A population writes its result before deregistering, so a `cached`
    /// that reads the store closes the gap between a caller's store miss
    /// and its arrival here. `cached` must not block or touch this
    /// registry.
    pub async fn run_unless_cached<C, F, Fut>(
        &self,
        key: &str,
        cached: C,
        factory: F,
    ) -> Result<Bytes>
    where
        C: FnOnce() -> Option<Bytes>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Bytes>> + Send + 'static,
    {
        let flight = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(key) {
                Some(flight) => {
                    debug!(key, "joining in-flight population");
                    flight.clone()
                }
                None => {
                    if let Some(value) = cached() {
                        debug!(key, "populated while waiting for the registry");
                        return Ok(value);
                    }
                    let flight = launch(Arc::clone(&self.in_flight), key, factory);
                    in_flight.insert(key.to_string(), flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Number of populations currently running.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

impl fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Removes a key's registration when the population ends, however it ends.
struct Registration {
    registry: Registry,
    key: String,
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.key);
    }
}

fn launch<F, Fut>(registry: Registry, key: &str, factory: F) -> Flight
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<Bytes>> + Send + 'static,
{
    debug!(key, "starting population");
    let registration = Registration {
        registry,
        key: key.to_string(),
    };

    // The caller holds the registry lock until the flight is inserted, so
    // the task cannot deregister before it has been registered.
    let task = tokio::spawn(async move {
        let outcome = factory().await;
        drop(registration);
        outcome
    });

    let key = key.to_string();
    async move {
        match task.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(key = %key, error = %err, "cache factory failed");
                Err(CacheError::factory(key, err))
            }
            Err(join_err) => {
                warn!(key = %key, error = %join_err, "cache factory task did not complete");
                Err(CacheError::factory(
                    key,
                    anyhow::anyhow!("factory task did not complete: {join_err}"),
                ))
            }
        }
    }
    .boxed()
    .shared()
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<String, Flight>> {
    registry.lock().expect("single-flight registry mutex poisoned")
}
