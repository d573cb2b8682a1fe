//! Queue consumer: extracts, reconciles and stores each queued listing.

use anyhow::{Context, Result};
use futures::StreamExt;
use listing_sync::config::Config;
use listing_sync::deps;
use listing_sync::queue::run_consumer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_sync=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        subject = %config.queue_subject,
        group = %config.queue_group,
        concurrency = config.worker_concurrency,
        "Starting builder"
    );

    let (deps, queue) = deps::connect(&config).await?;

    let deliveries = queue
        .subscribe(config.queue_group.clone())
        .await
        .context("Failed to subscribe to listing queue")?
        .take_until(Box::pin(tokio::signal::ctrl_c()));

    run_consumer(deliveries, deps.processor(), config.worker_concurrency).await;

    tracing::info!("Builder shut down");
    Ok(())
}
