//! Showtrack - watchlist metadata cache and episode scheduler
//!
//! Backend core for a personal media watchlist: a best-effort caching
//! layer in front of the TMDB metadata API and a scheduler for upcoming
//! episode air dates, both over one shared expiring key-value store.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod schedule;
mod store;
mod tasks;
mod tmdb;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use store::{MemoryStore, RedisStore, SharedStore};
use tasks::spawn_notifier_task;
use tmdb::TmdbClient;

/// Main entry point for the watchlist backend.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the shared store (Redis, or in-process without REDIS_URL)
/// 4. Start the due-episode notifier task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showtrack=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Showtrack watchlist backend");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, search_ttl={}s, detail_ttl={}s, search_index_limit={}, notify_interval={}s",
        config.server_port,
        config.search_ttl,
        config.detail_ttl,
        config.search_index_limit,
        config.notify_interval
    );

    // Connect the shared store; a failed Redis connection degrades
    // instead of aborting, caching is never a correctness dependency
    let store: SharedStore = match &config.redis_url {
        Some(url) => Arc::new(RedisStore::connect(url).await),
        None => {
            warn!("REDIS_URL not set, using in-process store");
            Arc::new(MemoryStore::new())
        }
    };

    // Create application state over the store
    let tmdb = TmdbClient::new(config.tmdb_base_url.clone(), config.tmdb_api_key.clone());
    let state = AppState::new(store, tmdb, &config);
    info!("Cache and scheduler initialized");

    // Start the due-episode notifier
    let (events, _) = broadcast::channel(64);
    let notifier_handle =
        spawn_notifier_task(state.scheduler.clone(), config.notify_interval, events);
    info!("Due-episode notifier started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(notifier_handle))
        .await
        .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the notifier task and allows graceful shutdown.
async fn shutdown_signal(notifier_handle: tokio::task::JoinHandle<()>) {
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

    // Abort the notifier task
    notifier_handle.abort();
    warn!("Notifier task aborted");
}
