//! Memo Cache - A namespace-scoped, single-flight in-memory cache
//!
//! Serves the cache's inspection and memoization endpoints over HTTP.

use std::net::SocketAddr;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_cache::api::create_router;
use memo_cache::cache::{registry, stats};
use memo_cache::{spawn_sweep_task, AppState, CacheGate, Config};

/// Main entry point for the Memo Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Install the process-wide cache registry
/// 4. Start background expired-entry sweep (unless disabled)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Memo Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: enabled={}, max_entries={}, default_ttl={}s, port={}, sweep_interval={}s",
        config.enabled,
        config.defaults.max_entries,
        config.defaults.default_ttl,
        config.server_port,
        config.sweep_interval
    );

    let server_port = config.server_port;
    let sweep_interval = config.sweep_interval;
    let cache_registry = registry::init_global(config).map_err(|err| {
        error!(error = %err, "Refusing to start with invalid cache configuration");
        err
    })?;
    if !cache_registry.is_enabled() {
        warn!("Caching is disabled; every request will run its factory");
    }

    let state = AppState {
        gate: CacheGate::new(cache_registry.clone(), stats::global()),
    };

    let sweep_handle =
        (sweep_interval > 0).then(|| spawn_sweep_task(cache_registry, sweep_interval));
    if sweep_handle.is_some() {
        info!("Background sweep task started");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
