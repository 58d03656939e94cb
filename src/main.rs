//! Mailstats Cache - best-effort cache for mail summary stats and sync cursors

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailstats_cache::api::create_router;
use mailstats_cache::backend::{CacheBackend, MemoryBackend, RedisBackend};
use mailstats_cache::config::{BackendKind, Config};
use mailstats_cache::{spawn_cleanup_task, AppState, SessionRegistry, StatsCursorCache};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the configured backend (falls back to no backend on failure)
/// 4. Create the session registry and the stats/cursor cache
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, stop the sweep task and clear the session registry
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailstats_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mailstats Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, stats_ttl={}s, cursor_ttl={}s, port={}",
        config.backend, config.stats_ttl, config.cursor_ttl, config.server_port
    );

    let (backend, cleanup_handle) = connect_backend(&config).await;
    let cache = StatsCursorCache::from_config(backend, &config)?;
    if !cache.is_enabled() {
        warn!("No cache backend configured, every lookup will miss");
    }

    let sessions = SessionRegistry::new();
    let state = AppState::new(cache, sessions.clone());
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    let cleared = sessions.clear().await;
    info!("Server shutdown complete, cleared {} sessions", cleared);
    Ok(())
}

/// Builds the configured backend.
///
/// A Redis backend that cannot be reached is not fatal: the service starts
/// without a backend and serves every lookup as a miss.
async fn connect_backend(
    config: &Config,
) -> (Option<Arc<dyn CacheBackend>>, Option<JoinHandle<()>>) {
    match config.backend {
        BackendKind::Redis => match RedisBackend::connect(&config.redis_url).await {
            Ok(backend) => {
                let backend: Arc<dyn CacheBackend> = Arc::new(backend);
                (Some(backend), None)
            }
            Err(error) => {
                warn!(%error, redis_url = %config.redis_url, "Redis unavailable, caching disabled");
                (None, None)
            }
        },
        BackendKind::Memory => {
            let memory = MemoryBackend::new();
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("Memory backend initialized");
            let backend: Arc<dyn CacheBackend> = Arc::new(memory);
            (Some(backend), Some(handle))
        }
        BackendKind::None => (None, None),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
