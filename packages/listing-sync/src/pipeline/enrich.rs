//! Enrichment Gate.
//!
//! Wraps the field-extraction service so its answer can only ever add
//! fields. Unavailability, timeouts and malformed answers all collapse to an
//! empty mapping.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::traits::enricher::FieldExtractor;
use crate::types::Enrichment;

#[derive(Clone)]
pub struct EnrichmentGate {
    extractor: Arc<dyn FieldExtractor>,
    timeout: Duration,
}

impl EnrichmentGate {
    pub fn new(extractor: Arc<dyn FieldExtractor>, timeout: Duration) -> Self {
        Self { extractor, timeout }
    }

    /// Ask the service for extra fields. Never fails.
    pub async fn enrich(&self, description: &str) -> Enrichment {
        if description.trim().is_empty() {
            return Enrichment::new();
        }

        let answer =
            match tokio::time::timeout(self.timeout, self.extractor.extract_fields(description))
                .await
            {
                Ok(Ok(value)) => value,
                Ok(Err(e)) => {
                    info!(error = %e, "Description enrichment failed");
                    return Enrichment::new();
                }
                Err(_) => {
                    info!(
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Description enrichment timed out"
                    );
                    return Enrichment::new();
                }
            };

        let enrichment = usable_fields(answer);
        debug!(fields = enrichment.len(), "Description enrichment answered");
        enrichment
    }
}

/// Keep only object entries whose value is neither `null` nor `"null"`.
fn usable_fields(answer: Value) -> Enrichment {
    let Value::Object(map) = answer else {
        info!("Description enrichment answered with a non-object payload");
        return Enrichment::new();
    };
    map.into_iter()
        .filter(|(_, value)| !matches!(value, Value::Null) && value.as_str() != Some("null"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_values_are_dropped() {
        let fields = usable_fields(json!({
            "demographic": "null",
            "term_length": null,
            "term_length_type": "summer",
            "furnished": false,
        }));
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["term_length_type"], json!("summer"));
        assert_eq!(fields["furnished"], json!(false));
    }

    #[test]
    fn test_non_object_answers_are_empty() {
        assert!(usable_fields(json!(["furnished"])).is_empty());
        assert!(usable_fields(json!("null")).is_empty());
    }
}
