//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::Cache;

/// Response body for the memoize operation (POST /memo/:namespace)
#[derive(Debug, Clone, Serialize)]
pub struct MemoResponse {
    /// Derived cache key
    pub key: String,
    /// The value served, cached or fresh
    pub value: String,
    /// True when this request's own value was not used: the response was
    /// served from the store or from a concurrent request's population
    pub cached: bool,
}

/// Response body for key derivation (POST /keys)
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    /// Canonical JSON form of the submitted payload
    pub canonical: String,
    /// SHA-256 of `canonical`, lowercase hex
    pub key: String,
}

/// One namespace in the GET /namespaces listing
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceInfo {
    pub namespace: String,
    /// Entries currently stored (expired ones count until observed)
    pub entries: usize,
    pub max_entries: usize,
    /// Default TTL in seconds
    pub default_ttl: u64,
    /// Populations currently running
    pub in_flight: usize,
}

impl NamespaceInfo {
    /// Describes a live cache
    pub fn from_cache(cache: &Cache) -> Self {
        let policy = cache.policy();
        Self {
            namespace: policy.namespace().to_string(),
            entries: cache.len(),
            max_entries: policy.max_entries(),
            default_ttl: policy.default_ttl(),
            in_flight: cache.in_flight(),
        }
    }
}

/// Response body for DELETE /stats
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub message: String,
}

impl ResetResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache statistics reset".to_string(),
        }
    }
}

impl Default for ResetResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
