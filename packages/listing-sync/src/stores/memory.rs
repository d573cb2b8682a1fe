//! In-memory listing store for testing and development.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::traits::store::ListingStore;
use crate::types::{ListingUpdate, StoredListing};

/// In-memory storage keyed by listing id.
///
/// Counts every mutation so tests can assert that a no-op really wrote nothing.
/// Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    listings: RwLock<HashMap<String, StoredListing>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with documents, without counting them as writes.
    pub fn with_listings(listings: impl IntoIterator<Item = StoredListing>) -> Self {
        let store = Self::new();
        {
            let mut map = store.listings.write().unwrap_or_else(|e| e.into_inner());
            for listing in listings {
                map.insert(listing.id.clone(), listing);
            }
        }
        store
    }

    /// Snapshot of one document.
    pub fn get(&self, id: &str) -> Option<StoredListing> {
        self.listings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.listings.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of insert/update/delete operations performed. Updates that
    /// match no document are not counted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn find(&self, id: &str) -> CollaboratorResult<Option<StoredListing>> {
        Ok(self.get(id))
    }

    async fn insert(&self, listing: &StoredListing) -> CollaboratorResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.listings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(listing.id.clone(), listing.clone());
        Ok(())
    }

    async fn update_fields(&self, id: &str, update: &ListingUpdate) -> CollaboratorResult<bool> {
        let mut listings = self.listings.write().unwrap_or_else(|e| e.into_inner());
        let Some(existing) = listings.get_mut(id) else {
            return Ok(false);
        };
        self.writes.fetch_add(1, Ordering::SeqCst);

        // Merge into a copy so a failed merge leaves the document untouched
        let mut merged = existing.clone();
        merged.apply(update).map_err(CollaboratorError::store)?;
        *existing = merged;
        Ok(true)
    }

    async fn list_ids(&self) -> CollaboratorResult<HashSet<String>> {
        Ok(self
            .listings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect())
    }

    async fn delete_many(&self, ids: &[String]) -> CollaboratorResult<u64> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut listings = self.listings.write().unwrap_or_else(|e| e.into_inner());
        let removed = ids.iter().filter(|id| listings.remove(*id).is_some()).count();
        Ok(removed as u64)
    }
}
