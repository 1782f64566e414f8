//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, keys_handler, memo_handler, namespaces_handler, reset_stats_handler,
    stats_handler, AppState,
};
use super::middleware::record_cache_events;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Cache events: Attaches each request's stats diff as `x-cache-events`
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/memo/:namespace", post(memo_handler))
        .route("/keys", post(keys_handler))
        .route("/stats", get(stats_handler).delete(reset_stats_handler))
        .route("/namespaces", get(namespaces_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_cache_events,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
