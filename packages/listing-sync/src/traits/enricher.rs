//! Field-extraction service used for enrichment.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollaboratorResult;

/// Derives additional fields from a listing description.
///
/// Implementations return the service's raw JSON answer. Filtering and
/// degradation to "no enrichment" happen in [`crate::pipeline::EnrichmentGate`].
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract_fields(&self, description: &str) -> CollaboratorResult<Value>;
}

/// Field extractor used when no service is configured. Always answers `{}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFieldExtractor;

#[async_trait]
impl FieldExtractor for NoopFieldExtractor {
    async fn extract_fields(&self, _description: &str) -> CollaboratorResult<Value> {
        Ok(Value::Object(Default::default()))
    }
}
