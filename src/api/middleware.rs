//! Request-scoped cache instrumentation
//!
//! Reports what each request did to the cache by diffing stats snapshots
//! taken around it.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::handlers::AppState;
use crate::cache::stats;

/// Response header carrying the request's sparse stats diff as JSON.
pub const CACHE_EVENTS_HEADER: &str = "x-cache-events";

/// Middleware recording cache events caused while serving a request.
///
/// Counters are process-wide, so events from concurrently served requests
/// can show up in the same diff.
pub async fn record_cache_events(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let before = state.gate.stats().snapshot();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    let changes = stats::diff(&before, &state.gate.stats().snapshot());
    if changes.is_empty() {
        return response;
    }

    debug!(path = %path, cache_events = ?changes, "request cache activity");
    if let Some(value) = serde_json::to_string(&changes)
        .ok()
        .and_then(|json| HeaderValue::from_str(&json).ok())
    {
        response.headers_mut().insert(CACHE_EVENTS_HEADER, value);
    }
    response
}
