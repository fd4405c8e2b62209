//! CareVault Server — application entry point.

use anyhow::{Context, Result};
use carevault_db::DbManager;
use carevault_server::config::Config;
use carevault_server::routes;
use carevault_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .json()
        .init();

    tracing::info!("Starting CareVault server...");

    let config = Config::from_env()?;

    let manager = DbManager::connect(&config.db)
        .await
        .context("Failed to connect to SurrealDB")?;
    carevault_db::run_migrations(manager.client())
        .await
        .context("Failed to run migrations")?;

    let state = AppState::new(manager.client().clone(), config.auth.clone(), config.policy);
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "CareVault server listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
