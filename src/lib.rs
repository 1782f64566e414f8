//! Memo Cache - A namespace-scoped, single-flight in-memory cache
//!
//! Deduplicates expensive asynchronous work (HTTP calls, LLM completions,
//! prompt assembly, database reads) behind a byte-oriented `get_or_set`,
//! with TTL expiration and LRU eviction per namespace.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{get_cache, Cache, CacheGate, CacheRegistry};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
