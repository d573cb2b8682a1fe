//! NATS-backed listing queue.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, info};

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::traits::queue::ListingQueue;
use crate::types::QueueMessage;

/// Publishes listing messages to a NATS subject as JSON.
#[derive(Clone)]
pub struct NatsQueue {
    client: async_nats::Client,
    subject: String,
}

impl NatsQueue {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }

    /// Connect to a NATS server.
    pub async fn connect(url: &str, subject: impl Into<String>) -> CollaboratorResult<Self> {
        let client = async_nats::connect(url)
            .await
            .map_err(CollaboratorError::queue)?;
        info!(url = %url, "Connected to NATS");
        Ok(Self::new(client, subject))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Flush buffered publishes to the server.
    pub async fn flush(&self) -> CollaboratorResult<()> {
        self.client.flush().await.map_err(CollaboratorError::queue)
    }

    /// Join the consumer group for this subject and stream message payloads.
    ///
    /// Members of the same group share the load; each message goes to one member.
    pub async fn subscribe(
        &self,
        group: impl Into<String>,
    ) -> CollaboratorResult<BoxStream<'static, Bytes>> {
        let group = group.into();
        let subscriber = self
            .client
            .queue_subscribe(self.subject.clone(), group.clone())
            .await
            .map_err(CollaboratorError::queue)?;
        info!(subject = %self.subject, group = %group, "Subscribed to listing queue");
        Ok(subscriber.map(|message| message.payload).boxed())
    }
}

#[async_trait]
impl ListingQueue for NatsQueue {
    async fn publish(&self, message: &QueueMessage) -> CollaboratorResult<()> {
        let payload = serde_json::to_vec(message).map_err(CollaboratorError::queue)?;
        self.client
            .publish(self.subject.clone(), Bytes::from(payload))
            .await
            .map_err(CollaboratorError::queue)?;
        debug!(listing_id = %message.listing_id, subject = %self.subject, "Published listing");
        Ok(())
    }
}
