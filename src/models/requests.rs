//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the memoize operation (POST /memo/:namespace)
///
/// # Fields
/// - `inputs`: Everything that determines the value; fingerprinted into the key
/// - `value`: The value to store on a miss
/// - `ttl`: Optional TTL in seconds (uses the namespace default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct MemoRequest {
    /// Inputs describing the cached computation
    pub inputs: Value,
    /// The value produced on a miss
    pub value: String,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl MemoRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.inputs.is_null() {
            return Some("Inputs cannot be null".to_string());
        }
        None
    }
}
