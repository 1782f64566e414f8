//! Expired-Entry Sweep Task
//!
//! Background task that periodically purges expired entries from every
//! namespace. Reads already drop expired entries they observe; the sweep
//! covers entries nobody reads again so they stop holding capacity.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that purges expired entries every
/// `sweep_interval_secs` seconds.
///
/// The sweep never performs LRU eviction; capacity is enforced by `set`
/// alone.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::new(Config::default())?);
/// let sweep_handle = spawn_sweep_task(registry.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(registry: Arc<CacheRegistry>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expired-entry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.purge_expired();
            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use bytes::Bytes;

    fn registry() -> Arc<CacheRegistry> {
        Arc::new(CacheRegistry::new(Config::default()).unwrap())
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let registry = registry();
        let cache = registry.get_cache("http").unwrap();
        cache
            .get_or_set("expire_soon", || async { anyhow::Ok(Bytes::from_static(b"v")) }, Some(1))
            .await
            .unwrap();

        let handle = spawn_sweep_task(registry.clone(), 1);

        // Wait for entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Gone without anyone reading it
        assert_eq!(cache.len(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let registry = registry();
        let cache = registry.get_cache("llm").unwrap();
        cache
            .get_or_set("long_lived", || async { anyhow::Ok(Bytes::from_static(b"v")) }, Some(3600))
            .await
            .unwrap();

        let handle = spawn_sweep_task(registry.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get("long_lived"), Some(Bytes::from_static(b"v")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let handle = spawn_sweep_task(registry(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
