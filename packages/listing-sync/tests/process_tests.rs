//! Per-message handling: input validation, unpersisted extraction and the
//! consumer loop.

mod common;

use bytes::Bytes;
use common::*;
use listing_sync::queue::run_consumer;
use listing_sync::testing::{MockFetcher, MockFieldExtractor};
use listing_sync::types::DEFAULT_PRODUCER;
use listing_sync::{
    ExtractionError, InputError, ListingState, MemoryStore, ProcessOutcome, QueueMessage,
    SyncError,
};
use serde_json::json;

#[tokio::test]
async fn missing_html_is_an_input_error_without_side_effects() {
    let harness = Harness::empty();
    let processor = harness.deps.processor();

    let result = processor
        .process_payload(&json!({"listing_id": "101922"}))
        .await;
    assert!(matches!(
        result,
        Err(SyncError::Input(InputError::MissingHtml))
    ));

    let result = processor
        .process_payload(&json!({"listing_id": "101922", "html_content": ["<p>"]}))
        .await;
    assert!(matches!(
        result,
        Err(SyncError::Input(InputError::HtmlNotString))
    ));

    assert!(harness.store.is_empty());
    assert_eq!(harness.enricher.call_count(), 0);
}

#[tokio::test]
async fn markup_without_details_block_stores_nothing() {
    let harness = Harness::empty();

    let result = harness
        .deps
        .processor()
        .process_payload(&json!({
            "listing_id": "101922",
            "html_content": "<html><body><h1>Gone</h1></body></html>",
        }))
        .await;

    assert!(matches!(
        result,
        Err(SyncError::Extraction(ExtractionError::AnchorMissing { .. }))
    ));
    assert_eq!(harness.store.write_count(), 0);
}

#[tokio::test]
async fn payload_without_listing_id_is_extracted_not_persisted() {
    let enricher = MockFieldExtractor::new().with_response(json!({"furnished": true}));
    let harness = Harness::new(MemoryStore::new(), MockFetcher::new(), enricher);

    let outcome = harness
        .deps
        .processor()
        .process_payload(&json!({"html_content": default_listing_html()}))
        .await
        .unwrap();

    let ProcessOutcome::Extracted { fields } = outcome else {
        panic!("expected extracted fields, got {outcome:?}");
    };
    assert_eq!(fields.price.as_deref(), Some("$1100"));
    assert_eq!(fields.extra["furnished"], json!(true));
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn queue_message_bytes_are_processed() {
    let harness = Harness::empty();
    let message = QueueMessage::new("101922", default_listing_html(), DEFAULT_PRODUCER);
    let bytes = serde_json::to_vec(&message).unwrap();

    let outcome = harness.deps.processor().process_bytes(&bytes).await.unwrap();

    assert_eq!(outcome.state(), Some(ListingState::New));
    assert!(harness.store.get("101922").is_some());
}

#[tokio::test]
async fn consumer_counts_processed_and_rejected_messages() {
    let harness = Harness::empty();

    let deliveries: Vec<Bytes> = vec![
        serde_json::to_vec(&QueueMessage::new("1", default_listing_html(), DEFAULT_PRODUCER))
            .unwrap()
            .into(),
        serde_json::to_vec(&QueueMessage::new("2", default_listing_html(), DEFAULT_PRODUCER))
            .unwrap()
            .into(),
        Bytes::from_static(b"not json"),
        Bytes::from_static(br#"{"listing_id": "3"}"#),
        serde_json::to_vec(&QueueMessage::new("4", "<html></html>", DEFAULT_PRODUCER))
            .unwrap()
            .into(),
    ];

    let stats = run_consumer(
        futures::stream::iter(deliveries),
        harness.deps.processor(),
        2,
    )
    .await;

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.rejected, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(harness.store.len(), 2);
}

#[tokio::test]
async fn redelivered_message_is_idempotent() {
    let harness = Harness::empty();
    let bytes: Bytes =
        serde_json::to_vec(&QueueMessage::new("1", default_listing_html(), DEFAULT_PRODUCER))
            .unwrap()
            .into();

    let stats = run_consumer(
        futures::stream::iter(vec![bytes.clone(), bytes]),
        harness.deps.processor(),
        1,
    )
    .await;

    assert_eq!(stats.processed, 2);
    assert_eq!(harness.store.len(), 1);
    assert_eq!(harness.store.write_count(), 1);
}

#[tokio::test]
async fn panicking_worker_is_counted_as_failed() {
    let harness = Harness::new(
        MemoryStore::new(),
        MockFetcher::new(),
        MockFieldExtractor::new().panicking(),
    );
    let blank_description = default_listing_html().replace(DESCRIPTION, " ");

    let deliveries: Vec<Bytes> = vec![
        serde_json::to_vec(&QueueMessage::new("1", default_listing_html(), DEFAULT_PRODUCER))
            .unwrap()
            .into(),
        serde_json::to_vec(&QueueMessage::new("2", blank_description, DEFAULT_PRODUCER))
            .unwrap()
            .into(),
    ];

    let stats = run_consumer(
        futures::stream::iter(deliveries),
        harness.deps.processor(),
        1,
    )
    .await;

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 1);
    assert!(harness.store.get("1").is_none());
    assert!(harness.store.get("2").is_some());
}
