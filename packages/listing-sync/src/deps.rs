//! Collaborator context.
//!
//! Each collaborator is built once per process and handed to the pipeline
//! stages explicitly. There are no global clients.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::ai::OpenAIFieldExtractor;
use crate::config::Config;
use crate::fetchers::HttpFetcher;
use crate::pipeline::{Discovery, DiscoveryConfig, EnrichmentGate, ListingProcessor, Reconciler};
use crate::queue::NatsQueue;
use crate::stores::PostgresStore;
use crate::traits::enricher::{FieldExtractor, NoopFieldExtractor};
use crate::traits::fetcher::PageFetcher;
use crate::traits::queue::ListingQueue;
use crate::traits::store::ListingStore;

#[derive(Clone)]
pub struct SyncDeps {
    pub fetcher: Arc<dyn PageFetcher>,
    pub store: Arc<dyn ListingStore>,
    pub queue: Arc<dyn ListingQueue>,
    pub field_extractor: Arc<dyn FieldExtractor>,
    pub enrichment_timeout: Duration,
    pub store_timeout: Duration,
}

impl SyncDeps {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn ListingStore>,
        queue: Arc<dyn ListingQueue>,
        field_extractor: Arc<dyn FieldExtractor>,
    ) -> Self {
        Self {
            fetcher,
            store,
            queue,
            field_extractor,
            enrichment_timeout: Duration::from_secs(20),
            store_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeouts(mut self, enrichment: Duration, store: Duration) -> Self {
        self.enrichment_timeout = enrichment;
        self.store_timeout = store;
        self
    }

    pub fn enrichment_gate(&self) -> EnrichmentGate {
        EnrichmentGate::new(self.field_extractor.clone(), self.enrichment_timeout)
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.store.clone(), self.enrichment_gate(), self.store_timeout)
    }

    pub fn processor(&self) -> ListingProcessor {
        ListingProcessor::new(self.reconciler())
    }

    pub fn discovery(&self, config: DiscoveryConfig) -> Discovery {
        Discovery::new(self.fetcher.clone(), self.queue.clone(), config)
    }
}

/// Connect every production collaborator described by `config`.
///
/// Returns the NATS handle alongside the context so binaries can subscribe
/// and flush.
pub async fn connect(config: &Config) -> Result<(SyncDeps, NatsQueue)> {
    let store = PostgresStore::connect(&config.database_url, config.store_timeout)
        .await
        .context("Failed to connect to database")?;
    store.migrate().await.context("Failed to run migrations")?;

    let queue = NatsQueue::connect(&config.nats_url, config.queue_subject.clone())
        .await
        .context("Failed to connect to NATS")?;

    let fetcher = HttpFetcher::new(config.http_timeout).context("Failed to build HTTP client")?;

    let field_extractor: Arc<dyn FieldExtractor> = match &config.openai_api_key {
        Some(key) => {
            info!(model = %config.openai_model, "Description enrichment enabled");
            Arc::new(OpenAIFieldExtractor::new(key.clone()).with_model(config.openai_model.clone()))
        }
        None => {
            info!("OPENAI_API_KEY not set, description enrichment disabled");
            Arc::new(NoopFieldExtractor)
        }
    };

    let deps = SyncDeps::new(
        Arc::new(fetcher),
        Arc::new(store),
        Arc::new(queue.clone()),
        field_extractor,
    )
    .with_timeouts(config.enrichment_timeout, config.store_timeout);

    Ok((deps, queue))
}
