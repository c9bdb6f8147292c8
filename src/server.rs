//! API server startup

use crate::api::{build_router, AppState};
use crate::config::Config;
use crate::store::Database;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Serve the API on `listener` until the future is dropped or fails.
pub async fn serve(listener: TcpListener, db: Database, config: &Config) -> Result<()> {
    let state = AppState::new(db, config);
    let (app, limiter) = build_router(state, config);

    let cleanup = limiter.as_ref().map(|l| l.spawn_cleanup());

    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("🎯 API server listening on {}", addr);

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error");

    if let Some(handle) = cleanup {
        handle.abort();
    }
    result
}

/// Bind `config.bind_addr`, open `config.db_path`, and serve.
pub async fn run(config: &Config) -> Result<()> {
    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path))?;
    info!("📚 Database ready at {}", config.db_path);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    serve(listener, db, config).await
}
