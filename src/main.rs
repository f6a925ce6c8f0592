//! Rental Inventory - REST backend for an equipment rental business
//!
//! Binary entry point: wires configuration, the relational store, the cache
//! backend and the HTTP server together.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rental_inventory::cache::{CacheBackend, MemoryBackend, RedisBackend};
use rental_inventory::config::{CacheBackendKind, DatabaseBackend};
use rental_inventory::db::{InventoryRepository, MemoryRepository, PgRepository};
use rental_inventory::{create_router, spawn_cleanup_task, AppState, Config};

/// # Startup Sequence
/// 1. Initialize tracing (overridable with RUST_LOG)
/// 2. Load configuration from environment variables
/// 3. Build the repository and probe it
/// 4. Connect the cache backend (a missing Redis is not fatal)
/// 5. Serve until Ctrl+C / SIGTERM, then close the pool
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rental_inventory=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rental Inventory API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, database={:?}, cache={:?}",
        config.server_port, config.database.backend, config.cache.backend
    );

    let repo = build_repository(&config)?;
    match repo.ping().await {
        Ok(()) => info!("Connected to {} database", repo.name()),
        Err(e) => error!(error = %e, "Database connection failed, serving errors until it recovers"),
    }

    let (cache, cleanup_handle) = build_cache(&config).await;
    info!("Cache backend: {}", cache.name());

    let state = AppState::new(repo.clone(), cache);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    repo.close();
    info!("Server shutdown complete");
    Ok(())
}

fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn InventoryRepository>> {
    let repo: Arc<dyn InventoryRepository> = match config.database.backend {
        DatabaseBackend::Postgres => Arc::new(
            PgRepository::connect(&config.database).context("failed to configure database pool")?,
        ),
        DatabaseBackend::Memory => match &config.database.seed_file {
            Some(path) => Arc::new(
                MemoryRepository::from_file(path)
                    .with_context(|| format!("failed to load dataset {}", path.display()))?,
            ),
            None => {
                warn!("No SEED_FILE set, starting with empty in-memory tables");
                Arc::new(MemoryRepository::new())
            }
        },
    };
    Ok(repo)
}

/// Returns the cache backend and, for the in-process store, its sweep task.
async fn build_cache(config: &Config) -> (Arc<dyn CacheBackend>, Option<JoinHandle<()>>) {
    match config.cache.backend {
        CacheBackendKind::Redis => {
            let backend = RedisBackend::connect(&config.cache.redis_url()).await;
            (Arc::new(backend), None)
        }
        CacheBackendKind::Memory => {
            let backend = MemoryBackend::new(config.cache.max_entries, config.cache.default_ttl);
            let handle = spawn_cleanup_task(backend.store(), config.cache.cleanup_interval);
            (Arc::new(backend), Some(handle))
        }
    }
}

/// Waits for Ctrl+C or SIGTERM, then stops the sweep task.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cache sweep task aborted");
    }
}
