//! Testing utilities including mock collaborators.
//!
//! These let the pipeline run end to end without network, queue or database.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::stores::MemoryStore;
use crate::traits::{
    enricher::FieldExtractor, fetcher::PageFetcher, queue::ListingQueue, store::ListingStore,
};
use crate::types::{ListingUpdate, QueueMessage, StoredListing};

/// Serves canned pages by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into(), body.into());
        self
    }

    /// Make `url` fail with a transport error.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into());
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|called| *called == url).count()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> CollaboratorResult<String> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        if self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
        {
            return Err(CollaboratorError::Fetch {
                url: url.to_string(),
                source: "connection refused".into(),
            });
        }

        self.pages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
            .ok_or_else(|| CollaboratorError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Records published messages. Can be told to reject specific listing ids.
#[derive(Default)]
pub struct MockQueue {
    messages: RwLock<Vec<QueueMessage>>,
    rejected_ids: RwLock<HashSet<String>>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every publish for `listing_id`.
    pub fn rejecting(self, listing_id: impl Into<String>) -> Self {
        self.rejected_ids
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(listing_id.into());
        self
    }

    pub fn messages(&self) -> Vec<QueueMessage> {
        self.messages.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn published_ids(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .map(|message| message.listing_id)
            .collect()
    }
}

#[async_trait]
impl ListingQueue for MockQueue {
    async fn publish(&self, message: &QueueMessage) -> CollaboratorResult<()> {
        if self
            .rejected_ids
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&message.listing_id)
        {
            return Err(CollaboratorError::queue("queue unavailable"));
        }
        self.messages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}

/// Field extractor with a canned answer.
pub struct MockFieldExtractor {
    response: Value,
    fail: bool,
    panic: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    descriptions: RwLock<Vec<String>>,
}

impl Default for MockFieldExtractor {
    fn default() -> Self {
        Self {
            response: Value::Object(Default::default()),
            fail: false,
            panic: false,
            delay: None,
            calls: AtomicUsize::new(0),
            descriptions: RwLock::new(Vec::new()),
        }
    }
}

impl MockFieldExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `response`.
    pub fn with_response(mut self, response: Value) -> Self {
        self.response = response;
        self
    }

    /// Fail every call.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Panic on every call, as a buggy client would.
    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Descriptions the service was asked about, in call order.
    pub fn descriptions(&self) -> Vec<String> {
        self.descriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl FieldExtractor for MockFieldExtractor {
    async fn extract_fields(&self, description: &str) -> CollaboratorResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.descriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(description.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic {
            panic!("field extractor panicked");
        }
        if self.fail {
            return Err(CollaboratorError::enrichment("service unavailable"));
        }
        Ok(self.response.clone())
    }
}

/// A store operation, for failure injection and call tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Find,
    Insert,
    Update,
    ListIds,
    Delete,
}

/// Wraps a [`MemoryStore`] and fails or stalls selected operations.
///
/// A failed operation never reaches the inner store, so tests can assert
/// that nothing was committed.
pub struct FailingStore {
    inner: MemoryStore,
    failing: HashSet<StoreOp>,
    delay: Option<Duration>,
    calls: RwLock<Vec<StoreOp>>,
}

impl FailingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            delay: None,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Fail every call of `op` with a store error.
    pub fn failing_on(mut self, op: StoreOp) -> Self {
        self.failing.insert(op);
        self
    }

    /// Sleep before every operation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Operations attempted so far, in call order.
    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn enter(&self, op: StoreOp) -> CollaboratorResult<()> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(op);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&op) {
            return Err(CollaboratorError::store("store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for FailingStore {
    async fn find(&self, id: &str) -> CollaboratorResult<Option<StoredListing>> {
        self.enter(StoreOp::Find).await?;
        self.inner.find(id).await
    }

    async fn insert(&self, listing: &StoredListing) -> CollaboratorResult<()> {
        self.enter(StoreOp::Insert).await?;
        self.inner.insert(listing).await
    }

    async fn update_fields(&self, id: &str, update: &ListingUpdate) -> CollaboratorResult<bool> {
        self.enter(StoreOp::Update).await?;
        self.inner.update_fields(id, update).await
    }

    async fn list_ids(&self) -> CollaboratorResult<HashSet<String>> {
        self.enter(StoreOp::ListIds).await?;
        self.inner.list_ids().await
    }

    async fn delete_many(&self, ids: &[String]) -> CollaboratorResult<u64> {
        self.enter(StoreOp::Delete).await?;
        self.inner.delete_many(ids).await
    }
}
