//! Message queue transport (producer side).

use async_trait::async_trait;

use crate::error::CollaboratorResult;
use crate::types::QueueMessage;

/// Publishes fetched listings for downstream processing.
///
/// Delivery is at-least-once; consumers must tolerate duplicates.
#[async_trait]
pub trait ListingQueue: Send + Sync {
    async fn publish(&self, message: &QueueMessage) -> CollaboratorResult<()>;
}
