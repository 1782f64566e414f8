//! Bounded Store Module
//!
//! Capacity-bounded key→bytes storage with LRU eviction and TTL expiration.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use bytes::Bytes;
use lru::LruCache;
use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Bounded Store ==
/// In-memory store holding at most `max_entries` live payloads.
///
/// Recency is tracked by the underlying [`LruCache`]: a successful `get` or a
/// fresh `set` moves the key to the most-recently-used position, and
/// inserting a new key at capacity evicts the least-recently-used entry
/// regardless of its remaining TTL. All operations take the internal mutex
/// for a short, non-suspending critical section.
#[derive(Debug)]
pub struct BoundedStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
    max_entries: NonZeroUsize,
}

impl BoundedStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`] when `max_entries` is zero.
    pub fn new(max_entries: usize) -> Result<Self> {
        let max_entries = NonZeroUsize::new(max_entries).ok_or_else(|| {
            CacheError::InvalidConfig("max_entries must be greater than zero".to_string())
        })?;

        Ok(Self {
            entries: Mutex::new(LruCache::new(max_entries)),
            max_entries,
        })
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_seconds`.
    ///
    /// Overwriting an existing key replaces both value and TTL and marks the
    /// key most-recently-used without counting against capacity twice.
    ///
    /// A `ttl_seconds` of zero describes a value that is already expired:
    /// nothing is stored, any existing entry for `key` is dropped, and no
    /// other entry is evicted.
    pub fn set(&self, key: &str, value: Bytes, ttl_seconds: u64) {
        if ttl_seconds == 0 {
            if self.lock().pop(key).is_some() {
                debug!(key, "zero-ttl set dropped existing entry");
            }
            return;
        }

        let entry = CacheEntry::new(value, ttl_seconds);
        let mut entries = self.lock();
        if let Some((evicted, _)) = entries.push(key.to_string(), entry) {
            if evicted != key {
                debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        debug_assert!(
            entries.len() <= self.max_entries.get(),
            "store holds {} entries, capacity is {}",
            entries.len(),
            self.max_entries
        );
    }

    // == Get ==
    /// Returns the live value for `key` and marks it most-recently-used.
    ///
    /// An expired entry is removed on observation and reported as absent.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut entries = self.lock();

        let expired = entries.peek(key)?.is_expired();
        if expired {
            entries.pop(key);
            debug!(key, "purged expired entry on read");
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Removes an entry by key, returning whether one was present.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().pop(key).is_some()
    }

    // == Purge Expired ==
    /// Removes all expired entries without touching recency of live ones.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let now = Instant::now();

        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key.as_str());
        }
        expired.len()
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // == Length ==
    /// Returns the number of stored entries, including not-yet-observed expired ones.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.max_entries.get()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().expect("bounded store mutex poisoned")
    }
}
