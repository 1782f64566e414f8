//! Per-namespace cache policy.

use crate::cache::MAX_TTL_SECONDS;
use crate::error::{CacheError, Result};

/// Immutable configuration bound to a single [`Cache`](crate::cache::Cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    namespace: String,
    default_ttl: u64,
    max_entries: usize,
}

impl CachePolicy {
    /// Validates and builds a policy.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`] for an empty namespace, a
    /// default TTL of zero or above [`MAX_TTL_SECONDS`], or a zero capacity.
    pub fn new(namespace: impl Into<String>, default_ttl: u64, max_entries: usize) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace cannot be empty".to_string(),
            ));
        }
        if default_ttl == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "default_ttl for namespace '{namespace}' must be greater than zero"
            )));
        }
        if default_ttl > MAX_TTL_SECONDS {
            return Err(CacheError::InvalidConfig(format!(
                "default_ttl for namespace '{namespace}' exceeds {MAX_TTL_SECONDS} seconds"
            )));
        }
        if max_entries == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "max_entries for namespace '{namespace}' must be greater than zero"
            )));
        }

        Ok(Self {
            namespace,
            default_ttl,
            max_entries,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// TTL in seconds applied when `get_or_set` gets no override.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
