use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fan_telemetry_service::{
    api::{self, AppState},
    config::Config,
    db,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent; env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    // Refuse to serve traffic without a working store.
    let pool = db::create_pool(&config.database_url)
        .await
        .context("failed to open sensor database")?;
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    info!(database_url = %config.database_url, "Database ready");

    if config.environment.allows_reset() {
        warn!(environment = ?config.environment, "POST /api/sensors/reset is enabled");
    }

    let state = AppState::from_config(pool, &config);
    info!(
        fan_limit_unit = ?state.commands.unit(),
        command_queue_capacity = config.command_queue_capacity,
        "Command queue ready"
    );

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on the first of Ctrl-C or (on unix) SIGTERM.
async fn shutdown_signal() {
    let reason = tokio::select! {
        res = signal::ctrl_c() => res.map(|()| "ctrl-c"),
        res = sigterm() => res.map(|()| "SIGTERM"),
    };

    match reason {
        Ok(reason) => info!(signal = reason, "Shutdown signal received; draining connections"),
        Err(e) => warn!(error = %e, "Signal handler failed; shutting down"),
    }
}

#[cfg(unix)]
async fn sigterm() -> std::io::Result<()> {
    let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    stream.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn sigterm() -> std::io::Result<()> {
    std::future::pending().await
}
