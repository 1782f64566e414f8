//! API Module
//!
//! HTTP handlers and routing for the cache server.
//!
//! # Endpoints
//! - `POST /memo/:namespace` - Memoize a value under the fingerprint of its inputs
//! - `POST /keys` - Derive the canonical form and key of a JSON payload
//! - `GET /stats` - Get cache event counters
//! - `DELETE /stats` - Reset cache event counters
//! - `GET /namespaces` - List namespaces and their policies
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{record_cache_events, CACHE_EVENTS_HEADER};
pub use routes::create_router;
