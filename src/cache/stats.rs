//! Cache Statistics Module
//!
//! Process-wide tally of cache events per namespace. The engine never writes
//! here itself; the caller layer records events so that request-scoped
//! instrumentation can report what a request did to the cache.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

/// Event names recorded by [`CacheGate`](crate::cache::CacheGate).
pub mod events {
    /// Value served from the store
    pub const HIT: &str = "hit";
    /// Value absent or expired, population requested
    pub const MISS: &str = "miss";
    /// Population succeeded and was written back
    pub const SET: &str = "set";
    /// Population failed
    pub const ERROR: &str = "error";
}

/// namespace → event → count
pub type StatsSnapshot = BTreeMap<String, BTreeMap<String, u64>>;

/// namespace → event → signed change between two snapshots
pub type StatsDiff = BTreeMap<String, BTreeMap<String, i64>>;

// == Stats Table ==
/// Mutex-protected event counters.
#[derive(Debug, Default)]
pub struct StatsTable {
    counts: Mutex<StatsSnapshot>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    // == Increment ==
    /// Adds one to `event` in `namespace`.
    pub fn increment(&self, namespace: &str, event: &str) {
        let mut counts = self.lock();
        *counts
            .entry(namespace.to_string())
            .or_default()
            .entry(event.to_string())
            .or_insert(0) += 1;
    }

    // == Snapshot ==
    /// Returns an independent copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().clone()
    }

    /// Returns the current count for one event.
    pub fn count(&self, namespace: &str, event: &str) -> u64 {
        self.lock()
            .get(namespace)
            .and_then(|events| events.get(event))
            .copied()
            .unwrap_or(0)
    }

    // == Reset ==
    /// Clears every counter.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, StatsSnapshot> {
        self.counts.lock().expect("stats table mutex poisoned")
    }
}

// == Diff ==
/// Computes the per-event change from `before` to `after`.
///
/// Only pairs whose count changed are present; a namespace with no changed
/// events is omitted entirely. Events that disappeared (after a reset) show
/// up as negative deltas.
pub fn diff(before: &StatsSnapshot, after: &StatsSnapshot) -> StatsDiff {
    let mut changes = StatsDiff::new();

    let namespaces = before.keys().chain(after.keys());
    for namespace in namespaces {
        if changes.contains_key(namespace) {
            continue;
        }
        let empty = BTreeMap::new();
        let old = before.get(namespace).unwrap_or(&empty);
        let new = after.get(namespace).unwrap_or(&empty);

        let deltas: BTreeMap<String, i64> = old
            .keys()
            .chain(new.keys())
            .filter_map(|event| {
                let delta = new.get(event).copied().unwrap_or(0) as i64
                    - old.get(event).copied().unwrap_or(0) as i64;
                (delta != 0).then(|| (event.clone(), delta))
            })
            .collect();

        if !deltas.is_empty() {
            changes.insert(namespace.clone(), deltas);
        }
    }

    changes
}

// == Process-wide Table ==
static GLOBAL_STATS: Lazy<Arc<StatsTable>> = Lazy::new(|| Arc::new(StatsTable::new()));

/// The process-wide stats table.
pub fn global() -> Arc<StatsTable> {
    Arc::clone(&GLOBAL_STATS)
}

pub fn increment(namespace: &str, event: &str) {
    GLOBAL_STATS.increment(namespace, event);
}

pub fn snapshot() -> StatsSnapshot {
    GLOBAL_STATS.snapshot()
}

/// Clears the process-wide table. Intended for tests and debugging.
pub fn reset() {
    GLOBAL_STATS.reset();
}
