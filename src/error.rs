//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP surface.
///
/// The type is `Clone` so that a single factory failure can be handed to
/// every caller waiting on the same in-flight population.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Rejected capacity, TTL or namespace at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Structured data could not be canonicalized or (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller-supplied factory failed while populating `key`
    #[error("{error}")]
    Factory {
        /// Cache key whose population failed
        key: String,
        /// The factory's own error, shared by every waiter
        error: Arc<anyhow::Error>,
    },
}

impl CacheError {
    /// Wraps a factory failure, attaching the key it was populating.
    pub fn factory(key: impl Into<String>, error: anyhow::Error) -> Self {
        CacheError::Factory {
            key: key.into(),
            error: Arc::new(error),
        }
    }

    /// Returns the original factory error, if this is a factory failure.
    pub fn factory_error(&self) -> Option<&anyhow::Error> {
        match self {
            CacheError::Factory { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Returns the key a factory failure belongs to.
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheError::Factory { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Factory { .. } => StatusCode::BAD_GATEWAY,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("upstream returned 503")]
    struct Upstream;

    #[test]
    fn test_factory_error_keeps_message_and_key() {
        let err = CacheError::factory("k1", anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.key(), Some("k1"));
    }

    #[test]
    fn test_factory_error_is_downcastable() {
        let err = CacheError::factory("k", anyhow::Error::new(Upstream));
        let inner = err.factory_error().unwrap();
        assert!(inner.downcast_ref::<Upstream>().is_some());
    }

    #[test]
    fn test_clone_shares_factory_error() {
        let err = CacheError::factory("k", anyhow::anyhow!("once"));
        let cloned = err.clone();
        match (&err, &cloned) {
            (CacheError::Factory { error: a, .. }, CacheError::Factory { error: b, .. }) => {
                assert!(Arc::ptr_eq(a, b));
            }
            _ => panic!("expected factory errors"),
        }
    }

    #[test]
    fn test_status_codes() {
        let resp = CacheError::InvalidRequest("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = CacheError::factory("k", anyhow::anyhow!("down")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = CacheError::InvalidConfig("zero".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
