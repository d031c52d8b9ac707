//! Assembly of the guestbook service: logging, store construction, and
//! the HTTP server loop. `main.rs` only parses the command line.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use guestbook_api::{ApiState, build_router};
use guestbook_core::GuestbookConfig;
use guestbook_core::config::{BackendKind, LogFormat};
use guestbook_store::{MemoryStore, SqlStore};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,guestbookd=debug,guestbook=debug";

/// Initialize tracing in the configured output format.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Open the SQL store named by the config.
async fn connect_sql(config: &GuestbookConfig) -> anyhow::Result<SqlStore> {
    let storage = &config.storage;
    SqlStore::connect(&storage.url, &storage.database_name, storage.max_connections)
        .await
        .with_context(|| format!("failed to open database {}", storage.url))
}

/// Build handler state for the configured backend.
///
/// For the SQL backend the schema is created here, once, before any
/// request is served. A schema failure is logged and serving continues;
/// queries against a missing table then fail on their own.
pub async fn build_state(config: &GuestbookConfig) -> anyhow::Result<ApiState> {
    match config.storage.backend {
        BackendKind::Memory => {
            let capacity = config.storage.memory_capacity;
            info!(capacity, "using in-memory comment store");
            Ok(ApiState::ephemeral(MemoryStore::new(capacity)))
        }
        BackendKind::Sqlite => {
            let store = connect_sql(config).await?;
            if let Err(e) = store.ensure_schema().await {
                warn!(error = %e, "schema initialization failed");
            }
            Ok(ApiState::persistent(store))
        }
    }
}

/// Run the idempotent schema step and exit.
pub async fn init_database(config: &GuestbookConfig) -> anyhow::Result<()> {
    let store = connect_sql(config).await?;
    store
        .ensure_schema()
        .await
        .context("schema initialization failed")?;
    store.close().await;
    info!(url = %config.storage.url, "database initialized");
    Ok(())
}

/// Serve the API until Ctrl-C or SIGTERM.
pub async fn serve(config: &GuestbookConfig) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    let router = build_router(state);
    let addr = config.server.bind;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, backend = ?config.storage.backend, "guestbook API listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("guestbook daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
