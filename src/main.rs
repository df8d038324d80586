//! Entry point for the food ordering HTTP service.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use foodhub_core::catalog::{seed_default_catalog, SqliteProductRepository};
use foodhub_core::order::{OrderService, SqliteOrderRepository};
use foodhub_core::{build_router, AppState, Config, Database, Validator};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(service = %config.service, env = %config.env, "starting up");

    let db = Database::new(Path::new(&config.db_path))
        .await
        .context("failed to initialize database")?;

    seed_default_catalog(db.pool())
        .await
        .context("failed to seed default product catalog")?;

    let (validator, load_error) = Validator::new(&config.coupon_dir).await;
    if let Some(err) = load_error {
        warn!(error = %err, "coupon index did not finish loading cleanly, validation will be degraded");
    }

    let state = AppState {
        products: Arc::new(SqliteProductRepository::new(db.pool().clone())),
        orders: Arc::new(OrderService::new(
            Arc::new(SqliteOrderRepository::new(db.pool().clone())),
            Arc::new(validator),
        )),
        api_key: Arc::from(config.api_key.as_str()),
    };

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");

    let shutdown = shutdown_signal()
        .await
        .context("failed to install shutdown signal handlers")?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("server stopped successfully");
    Ok(())
}

/// Builds the future `axum::serve` awaits for a graceful-shutdown trigger.
/// Installing the OS signal handlers can fail (e.g. handler slots
/// exhausted); that failure is propagated like any other startup error
/// instead of panicking.
async fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;

    Ok(async move {
        #[cfg(unix)]
        let terminate = terminate.recv();
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            result = ctrl_c => {
                if let Err(err) = result {
                    warn!(error = %err, "failed to listen for Ctrl+C, shutting down anyway");
                }
            }
            () = terminate => {},
        }

        info!("shutdown signal received, shutting down gracefully");
    })
}
