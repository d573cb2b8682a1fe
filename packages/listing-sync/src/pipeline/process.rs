//! Per-message handler: validate, extract, reconcile.

use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use super::reconcile::Reconciler;
use crate::error::Result;
use crate::extractor::ListingExtractor;
use crate::types::{ListingFields, ListingState, ProcessRequest, StoredListing};

/// What processing one message did.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Inserted or updated
    Stored {
        state: ListingState,
        listing: StoredListing,
    },
    /// Both fingerprints matched; nothing written
    NoChanges { listing_id: String },
    /// No listing id supplied: extracted and enriched, not persisted
    Extracted { fields: ListingFields },
}

impl ProcessOutcome {
    pub fn state(&self) -> Option<ListingState> {
        match self {
            Self::Stored { state, .. } => Some(*state),
            Self::NoChanges { .. } => Some(ListingState::Unchanged),
            Self::Extracted { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct ListingProcessor {
    extractor: ListingExtractor,
    reconciler: Reconciler,
}

impl ListingProcessor {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            extractor: ListingExtractor::new(),
            reconciler,
        }
    }

    pub async fn process(&self, request: ProcessRequest) -> Result<ProcessOutcome> {
        let span = info_span!(
            "process_listing",
            listing_id = request.listing_id.as_deref().unwrap_or("-")
        );
        self.process_inner(request).instrument(span).await
    }

    async fn process_inner(&self, request: ProcessRequest) -> Result<ProcessOutcome> {
        let mut fields = self.extractor.extract(&request.html_content)?;

        let Some(listing_id) = request.listing_id else {
            let enrichment = self.reconciler.gate().enrich(fields.description_text()).await;
            fields.merge_enrichment(enrichment);
            debug!("No listing id, returning extracted fields without persisting");
            return Ok(ProcessOutcome::Extracted { fields });
        };

        let reconciliation = self.reconciler.reconcile(&listing_id, fields).await?;
        Ok(match reconciliation.state {
            ListingState::Unchanged => ProcessOutcome::NoChanges { listing_id },
            state => ProcessOutcome::Stored {
                state,
                listing: reconciliation.listing,
            },
        })
    }

    /// Validate an untyped payload, then process it.
    pub async fn process_payload(&self, payload: &Value) -> Result<ProcessOutcome> {
        let request = ProcessRequest::from_value(payload)?;
        self.process(request).await
    }

    /// Entry point for raw queue deliveries.
    pub async fn process_bytes(&self, bytes: &[u8]) -> Result<ProcessOutcome> {
        let request = ProcessRequest::from_slice(bytes)?;
        self.process(request).await
    }
}
