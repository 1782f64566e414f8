//! Cache Module
//!
//! Namespace-scoped in-memory caching with TTL expiration, LRU eviction and
//! single-flight population.

mod engine;
mod entry;
mod flight;
mod gate;
pub mod keys;
mod policy;
pub mod registry;
pub mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::Cache;
pub use entry::{CacheEntry, MAX_TTL_SECONDS};
pub use flight::SingleFlight;
pub use gate::CacheGate;
pub use keys::{canonical_json, canonical_query_string, fingerprint, hash_bytes, hash_text};
pub use policy::CachePolicy;
pub use registry::{get_cache, CacheRegistry};
pub use stats::{events, StatsDiff, StatsSnapshot, StatsTable};
pub use store::BoundedStore;
