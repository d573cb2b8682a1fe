//! Reconciler: classifies an extracted listing against the store and commits
//! the matching write.
//!
//! | prior document | fingerprints        | state       | enrichment        | write          |
//! |----------------|---------------------|-------------|-------------------|----------------|
//! | none           | -                   | `New`       | always            | insert         |
//! | present        | both equal          | `Unchanged` | never             | none           |
//! | present        | json or description | `Updated`   | description moved | one field merge |
//!
//! The deletion pass is separate: ids in the store but not in the crawl are
//! `Orphaned` and removed. Nothing here retries; that belongs to the caller.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::bounded;
use super::discovery::CrawlResult;
use super::enrich::EnrichmentGate;
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::traits::store::ListingStore;
use crate::types::{ListingFields, ListingState, ListingUpdate, StoredListing};

/// Result of reconciling one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub state: ListingState,
    /// The document as it now stands in the store
    pub listing: StoredListing,
    /// Whether the enrichment service was asked about the description
    pub enriched: bool,
}

/// Result of a deletion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pruning {
    /// Orphaned ids removed from the store, sorted
    Deleted(Vec<String>),
    /// The crawl cannot be trusted as the full id set
    Skipped { reason: &'static str },
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ListingStore>,
    gate: EnrichmentGate,
    store_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ListingStore>,
        gate: EnrichmentGate,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            gate,
            store_timeout,
        }
    }

    pub fn gate(&self) -> &EnrichmentGate {
        &self.gate
    }

    /// Classify `fields` for listing `id` and commit the result.
    pub async fn reconcile(
        &self,
        id: &str,
        mut fields: ListingFields,
    ) -> CollaboratorResult<Reconciliation> {
        // Fingerprints cover the extracted fields only, never enrichment output
        let checksums = fields.checksums();

        let prior = bounded("store find", self.store_timeout, self.store.find(id)).await?;

        let Some(mut prior) = prior else {
            let enriched = !fields.description_text().trim().is_empty();
            let enrichment = self.gate.enrich(fields.description_text()).await;
            fields.merge_enrichment(enrichment);

            let listing = StoredListing::new(id, fields, checksums);
            bounded("store insert", self.store_timeout, self.store.insert(&listing)).await?;

            info!(listing_id = %id, state = %ListingState::New, "Listing stored");
            return Ok(Reconciliation {
                state: ListingState::New,
                listing,
                enriched,
            });
        };

        let previous = prior.checksums();
        if previous == checksums {
            debug!(listing_id = %id, state = %ListingState::Unchanged, "Listing unchanged");
            return Ok(Reconciliation {
                state: ListingState::Unchanged,
                listing: prior,
                enriched: false,
            });
        }

        let description_moved = previous.description != checksums.description;
        let enriched = description_moved && !fields.description_text().trim().is_empty();
        if description_moved {
            let enrichment = self.gate.enrich(fields.description_text()).await;
            fields.merge_enrichment(enrichment);
        }

        let update = ListingUpdate { fields, checksums };
        let matched = bounded(
            "store update",
            self.store_timeout,
            self.store.update_fields(id, &update),
        )
        .await?;

        let listing = if matched {
            prior.apply(&update).map_err(CollaboratorError::store)?;
            prior
        } else {
            // Removed by a racing deletion pass; write the fresh snapshot back
            warn!(listing_id = %id, "Listing vanished before update, re-inserting");
            let listing = StoredListing::new(id, update.fields, update.checksums);
            bounded("store insert", self.store_timeout, self.store.insert(&listing)).await?;
            listing
        };

        info!(
            listing_id = %id,
            state = %ListingState::Updated,
            description_changed = description_moved,
            "Listing updated"
        );
        Ok(Reconciliation {
            state: ListingState::Updated,
            listing,
            enriched,
        })
    }

    /// Remove every stored id missing from `current_ids`. Returns the removed ids, sorted.
    pub async fn delete_orphans(
        &self,
        current_ids: &HashSet<String>,
    ) -> CollaboratorResult<Vec<String>> {
        let stored = bounded("store list", self.store_timeout, self.store.list_ids()).await?;
        let orphaned = orphaned_ids(&stored, current_ids);

        if orphaned.is_empty() {
            info!(stored = stored.len(), current = current_ids.len(), "No orphaned listings");
            return Ok(orphaned);
        }

        let removed = bounded(
            "store delete",
            self.store_timeout,
            self.store.delete_many(&orphaned),
        )
        .await?;

        for id in &orphaned {
            debug!(listing_id = %id, state = %ListingState::Orphaned, "Listing removed");
        }
        info!(orphaned = orphaned.len(), removed, "Deletion pass finished");
        Ok(orphaned)
    }

    /// Deletion pass driven by a crawl. Refuses to run on a crawl that did
    /// not cover the whole index or saw no listings at all.
    pub async fn prune(&self, crawl: &CrawlResult) -> CollaboratorResult<Pruning> {
        if !crawl.complete {
            warn!(pages = crawl.pages, "Crawl ended early, skipping deletion pass");
            return Ok(Pruning::Skipped {
                reason: "crawl incomplete",
            });
        }
        if crawl.seen_ids.is_empty() {
            warn!("Crawl saw no listings, skipping deletion pass");
            return Ok(Pruning::Skipped {
                reason: "crawl saw no listings",
            });
        }
        self.delete_orphans(crawl.seen_ids.as_set())
            .await
            .map(Pruning::Deleted)
    }
}

/// `stored - current`, sorted.
pub fn orphaned_ids(stored: &HashSet<String>, current: &HashSet<String>) -> Vec<String> {
    let mut orphaned: Vec<String> = stored.difference(current).cloned().collect();
    orphaned.sort();
    orphaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_orphaned_ids_is_store_minus_crawl() {
        let orphaned = orphaned_ids(&ids(&["a", "b", "c"]), &ids(&["b", "c", "d"]));
        assert_eq!(orphaned, vec!["a".to_string()]);
    }

    #[test]
    fn test_orphaned_ids_sorted() {
        let orphaned = orphaned_ids(&ids(&["z", "m", "a"]), &HashSet::new());
        assert_eq!(orphaned, vec!["a", "m", "z"]);
    }
}
