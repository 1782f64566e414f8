//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use serde_json::Value;

use crate::cache::{
    canonical_json, fingerprint, hash_text, CacheGate, CacheRegistry, StatsSnapshot, StatsTable,
};
use crate::error::{CacheError, Result};
use crate::models::{
    HealthResponse, KeyResponse, MemoRequest, MemoResponse, NamespaceInfo, ResetResponse,
};

/// Application state shared across all handlers.
///
/// Holds the gate (and through it the registry and stats table) the server
/// reads and writes.
#[derive(Clone)]
pub struct AppState {
    pub gate: CacheGate,
}

impl AppState {
    /// Creates a new AppState with the given registry and stats table.
    pub fn new(registry: Arc<CacheRegistry>, stats: Arc<StatsTable>) -> Self {
        Self {
            gate: CacheGate::new(registry, stats),
        }
    }

    /// Creates an AppState over the process-wide registry and stats table.
    pub fn global() -> Self {
        Self {
            gate: CacheGate::global(),
        }
    }
}

/// Handler for POST /memo/:namespace
///
/// Memoizes `value` under the fingerprint of `inputs` in `namespace`. The
/// first request for a given input stores its value; later ones get the
/// stored value back until it expires. A request that arrives while another
/// one for the same input is still being stored shares that request's value
/// and is reported as `cached`.
pub async fn memo_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Json(req): Json<MemoRequest>,
) -> Result<Json<MemoResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = fingerprint(&req.inputs)?;
    let produced = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&produced);
    let value = req.value;
    let bytes = state
        .gate
        .get_or_set(
            &namespace,
            &key,
            move || async move {
                flag.store(true, Ordering::SeqCst);
                anyhow::Ok(Bytes::from(value))
            },
            req.ttl,
        )
        .await?;

    let value = String::from_utf8(bytes.to_vec())
        .map_err(|err| CacheError::Serialization(err.to_string()))?;

    Ok(Json(MemoResponse {
        key,
        value,
        cached: !produced.load(Ordering::SeqCst),
    }))
}

/// Handler for POST /keys
///
/// Returns the canonical JSON form of the body and the key derived from it.
pub async fn keys_handler(Json(payload): Json<Value>) -> Result<Json<KeyResponse>> {
    let canonical = canonical_json(&payload)?;
    let key = hash_text(&canonical);

    Ok(Json(KeyResponse { canonical, key }))
}

/// Handler for GET /stats
///
/// Returns every event counter, namespace → event → count.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.gate.stats().snapshot())
}

/// Handler for DELETE /stats
///
/// Clears every event counter. Meant for debugging.
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    state.gate.stats().reset();
    Json(ResetResponse::new())
}

/// Handler for GET /namespaces
///
/// Lists the namespaces created so far with their size and policy.
pub async fn namespaces_handler(State(state): State<AppState>) -> Json<Vec<NamespaceInfo>> {
    let registry = state.gate.registry();
    let namespaces = registry
        .namespaces()
        .iter()
        .filter_map(|name| registry.get_cache(name).ok())
        .map(|cache| NamespaceInfo::from_cache(&cache))
        .collect();

    Json(namespaces)
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
