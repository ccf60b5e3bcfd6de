mod common;
mod config;
mod reports;
mod routes;
mod services;
mod storage;

#[cfg(test)]
mod test_helpers;

use crate::config::Config;
use crate::storage::history::HistoryStores;
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing/logging
    tracing_subscriber::fmt::init();

    // Load configuration and environment variables to pass to the application
    let config: Config = Config::from_env();

    let stores = HistoryStores::open(&config.data_dir)
        .with_context(|| format!("Could not open history in {}", config.data_dir.display()))?;

    tracing::info!(
        "Starting {} for {} ({} deployment, {} well replacement, history in {}) ...",
        config.app_name,
        config.field_name,
        config.deployment.to_uppercase(),
        config.well_replace_policy,
        stores.data_dir().display()
    );

    let router = routes::build_router(&config, stores);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Could not bind {}", config.bind_address))?;
    tracing::info!("Listening on {}", config.bind_address);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
