mod config;
mod db;
mod error;
mod server;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Args;
use db::Database;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db = Database::connect(&args.database_url).await?;
    info!("connected to database");

    let catalog = db.metadata().await?;
    info!(tables = catalog.tables.len(), "catalog built");

    let app = server::router(AppState::new(db.clone(), catalog));

    let listener = TcpListener::bind(config::LISTEN_ADDR)
        .await
        .with_context(|| format!("failed to bind {}", config::LISTEN_ADDR))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close();
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
