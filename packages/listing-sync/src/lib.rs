//! # Listing Sync
//!
//! Keeps a listing store in step with a housing classifieds site.
//!
//! - **Discovery** walks the paginated index and queues each listing page
//! - **Extraction** turns one listing page into typed fields
//! - **Reconciliation** fingerprints the fields and decides between insert,
//!   field-level update, no-op, or (for the deletion pass) removal
//! - **Enrichment** asks an optional field-extraction service for details
//!   the markup does not carry, only when the description is new or changed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use listing_sync::{SyncDeps, MemoryStore, testing::{MockFetcher, MockQueue}};
//! use listing_sync::traits::enricher::NoopFieldExtractor;
//! use std::sync::Arc;
//!
//! let deps = SyncDeps::new(
//!     Arc::new(MockFetcher::new()),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MockQueue::new()),
//!     Arc::new(NoopFieldExtractor),
//! );
//!
//! let outcome = deps.processor().process_payload(&payload).await?;
//! ```

pub mod ai;
pub mod checksum;
pub mod config;
pub mod deps;
pub mod error;
pub mod extractor;
pub mod fetchers;
pub mod pipeline;
pub mod queue;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use checksum::{canonicalize, document_fingerprint, fingerprint, text_fingerprint};
pub use config::Config;
pub use deps::SyncDeps;
pub use error::{
    CollaboratorError, CollaboratorResult, ExtractionError, InputError, Result, SyncError,
};
pub use extractor::ListingExtractor;
pub use pipeline::{
    CrawlResult, Discovery, DiscoveryConfig, EnrichmentGate, ListingProcessor, ProcessOutcome,
    Pruning, Reconciler, Reconciliation,
};
pub use stores::{MemoryStore, PostgresStore};
pub use types::{
    Checksums, Enrichment, ListingFields, ListingState, ListingUpdate, OrderedSet, ProcessRequest,
    QueueMessage, StoredListing,
};
