//! Crawl the listing index, queue every listing page, then remove stored
//! listings the crawl no longer saw.

use anyhow::{Context, Result};
use clap::Parser;
use listing_sync::config::Config;
use listing_sync::deps;
use listing_sync::pipeline::{DiscoveryConfig, Pruning};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crawler")]
#[command(about = "Discover housing listings and queue them for processing")]
struct Cli {
    /// Stop after this many index pages (overrides CRAWL_MAX_PAGES)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Do not remove listings missing from this crawl
    #[arg(long)]
    skip_delete: bool,
}

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

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(source = %config.source_base_url, "Starting crawler");

    let (deps, queue) = deps::connect(&config).await?;

    let discovery_config = DiscoveryConfig::new(config.source_base_url.clone())
        .with_max_pages(cli.max_pages.or(config.crawl_max_pages))
        .with_empty_page_tolerance(config.crawl_empty_page_tolerance);

    let crawl = deps.discovery(discovery_config).crawl().await;
    queue.flush().await.context("Failed to flush queued listings")?;

    if cli.skip_delete {
        tracing::info!("Deletion pass skipped by flag");
        return Ok(());
    }

    match deps
        .reconciler()
        .prune(&crawl)
        .await
        .context("Deletion pass failed")?
    {
        Pruning::Deleted(ids) => tracing::info!(removed = ids.len(), "Deletion pass complete"),
        Pruning::Skipped { reason } => tracing::warn!(reason, "Deletion pass skipped"),
    }

    Ok(())
}
