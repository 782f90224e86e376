//! objcache server - HTTP front for an in-process object cache
//!
//! Serves one LRU-backed cache front over JSON for inspection and manual use.

use std::net::SocketAddr;

use anyhow::Context as _;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use objcache::api::create_router;
use objcache::{AppState, Config, ObjectCache};

/// Main entry point for the objcache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the LRU backend and object cache
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Close the cache on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "objcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting objcache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, track_by_size={}, port={}",
        config.capacity, config.track_by_size, config.server_port
    );

    let state = AppState::from_config(&config).context("failed to build cache backend")?;
    info!(
        "Cache initialized: capacity={}, mode={:?}",
        state.engine.capacity(),
        state.mode
    );

    let cache = state.cache.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cache))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then closes the cache.
async fn shutdown_signal(cache: ObjectCache) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
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

    if let Err(err) = cache.close().await {
        warn!("Failed to close cache: {}", err);
    }
}
