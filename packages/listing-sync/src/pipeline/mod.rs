//! The listing pipeline: discovery, enrichment, reconciliation and the
//! per-message handler that ties extraction to the store.

pub mod discovery;
pub mod enrich;
pub mod process;
pub mod reconcile;

use std::future::Future;
use std::time::Duration;

use crate::error::{CollaboratorError, CollaboratorResult};

pub use discovery::{listing_id_from_url, listing_links, CrawlResult, Discovery, DiscoveryConfig};
pub use enrich::EnrichmentGate;
pub use process::{ListingProcessor, ProcessOutcome};
pub use reconcile::{orphaned_ids, Pruning, Reconciler, Reconciliation};

/// Run a collaborator call under a deadline.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = CollaboratorResult<T>>,
) -> CollaboratorResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CollaboratorError::Timeout { operation })?
}
