//! Persistent listing store.
//!
//! Every mutation is a single atomic operation on one document (or one
//! batch delete). There are no transactions and no optimistic concurrency:
//! concurrent writes to the same id are last-write-wins.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::CollaboratorResult;
use crate::types::{ListingUpdate, StoredListing};

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Load the stored document for an id.
    async fn find(&self, id: &str) -> CollaboratorResult<Option<StoredListing>>;

    /// Insert a new document. An existing document with the same id is replaced.
    async fn insert(&self, listing: &StoredListing) -> CollaboratorResult<()>;

    /// Field-level merge into an existing document.
    ///
    /// Fields carried by the update overwrite, all others are kept. Both
    /// checksums are always replaced. Returns `false` if no document matched.
    async fn update_fields(&self, id: &str, update: &ListingUpdate) -> CollaboratorResult<bool>;

    /// Every id currently in the store.
    async fn list_ids(&self) -> CollaboratorResult<HashSet<String>>;

    /// Remove the given ids. Returns how many documents were deleted.
    async fn delete_many(&self, ids: &[String]) -> CollaboratorResult<u64>;
}
