//! Cleanup worker: drains the durable reclamation queue.
//!
//! Runs as its own process so pending cleanups survive restarts of the
//! web-facing service.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tailor_api::cleanup::run_worker;
use tailor_api::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("tailor_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cleanup worker v{}", env!("CARGO_PKG_VERSION"));

    let redis = redis::Client::open(config.redis_url.clone())?;
    let conn = redis
        .get_connection_manager()
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    run_worker(
        conn,
        Duration::from_secs(config.cleanup_poll_interval_secs),
    )
    .await;

    Ok(())
}
