//! Queue message and per-message request types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InputError;

/// Producer tag written by the crawler.
pub const DEFAULT_PRODUCER: &str = "listing_sync.crawler";

/// One fetched listing, as published by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub listing_id: String,
    pub html_content: String,
    /// ISO-8601 UTC with a `Z` suffix
    pub timestamp: String,
    pub producer: String,
}

impl QueueMessage {
    pub fn new(
        listing_id: impl Into<String>,
        html_content: impl Into<String>,
        producer: impl Into<String>,
    ) -> Self {
        Self::at(listing_id, html_content, producer, Utc::now())
    }

    /// Build a message with an explicit timestamp.
    pub fn at(
        listing_id: impl Into<String>,
        html_content: impl Into<String>,
        producer: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            html_content: html_content.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
            producer: producer.into(),
        }
    }
}

/// Validated per-message input: `{html_content, listing_id?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub html_content: String,
    pub listing_id: Option<String>,
}

impl ProcessRequest {
    pub fn new(html_content: impl Into<String>, listing_id: Option<String>) -> Self {
        Self {
            html_content: html_content.into(),
            listing_id,
        }
    }

    /// Validate an untyped payload.
    ///
    /// A missing or `null` `html_content` is reported separately from one of
    /// the wrong type. An empty `listing_id` counts as absent.
    pub fn from_value(payload: &Value) -> Result<Self, InputError> {
        let object = payload
            .as_object()
            .ok_or_else(|| InputError::Malformed("payload is not a JSON object".into()))?;

        let html_content = match object.get("html_content") {
            None | Some(Value::Null) => return Err(InputError::MissingHtml),
            Some(Value::String(html)) => html.clone(),
            Some(_) => return Err(InputError::HtmlNotString),
        };

        let listing_id = match object.get("listing_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) if id.trim().is_empty() => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => return Err(InputError::ListingIdNotString),
        };

        Ok(Self {
            html_content,
            listing_id,
        })
    }

    /// Parse raw message bytes (as delivered by the queue).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InputError> {
        let payload: Value =
            serde_json::from_slice(bytes).map_err(|e| InputError::Malformed(e.to_string()))?;
        Self::from_value(&payload)
    }
}

impl From<QueueMessage> for ProcessRequest {
    fn from(message: QueueMessage) -> Self {
        Self {
            html_content: message.html_content,
            listing_id: Some(message.listing_id),
        }
    }
}
