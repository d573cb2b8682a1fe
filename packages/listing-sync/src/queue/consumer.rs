//! Consumer loop: runs the per-message handler over a stream of deliveries.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::pipeline::{ListingProcessor, ProcessOutcome};

/// Counters for one consumer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub processed: usize,
    pub rejected: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Counters {
    processed: AtomicUsize,
    rejected: AtomicUsize,
    failed: AtomicUsize,
}

/// Process deliveries until the stream ends, at most `concurrency` at a time.
///
/// Bad messages (input or extraction errors) are counted as rejected.
/// Collaborator failures and panicked workers are counted as failed;
/// redelivery is the transport's concern.
pub async fn run_consumer<S>(
    mut deliveries: S,
    processor: ListingProcessor,
    concurrency: usize,
) -> ConsumerStats
where
    S: Stream<Item = Bytes> + Unpin,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let counters = Arc::new(Counters::default());
    let mut tasks = JoinSet::new();

    while let Some(payload) = deliveries.next().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let processor = processor.clone();
        let task_counters = counters.clone();

        tasks.spawn(async move {
            let _permit = permit;
            match processor.process_bytes(&payload).await {
                Ok(outcome) => {
                    task_counters.processed.fetch_add(1, Ordering::Relaxed);
                    log_outcome(&outcome);
                }
                Err(e @ (SyncError::Input(_) | SyncError::Extraction(_))) => {
                    task_counters.rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, bytes = payload.len(), "Rejected message");
                }
                Err(e) => {
                    task_counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(error = %e, "Message processing failed");
                }
            }
        });

        // Reap finished tasks so the set does not grow with the stream
        while let Some(joined) = tasks.try_join_next() {
            reap(joined, &counters);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        reap(joined, &counters);
    }

    let stats = ConsumerStats {
        processed: counters.processed.load(Ordering::Relaxed),
        rejected: counters.rejected.load(Ordering::Relaxed),
        failed: counters.failed.load(Ordering::Relaxed),
    };
    info!(
        processed = stats.processed,
        rejected = stats.rejected,
        failed = stats.failed,
        "Consumer stopped"
    );
    stats
}

/// A worker that panicked never reached its own counter; count it as failed.
fn reap(joined: Result<(), JoinError>, counters: &Counters) {
    if let Err(e) = joined {
        counters.failed.fetch_add(1, Ordering::Relaxed);
        error!(error = %e, "Worker task panicked");
    }
}

fn log_outcome(outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Stored { state, listing } => {
            debug!(listing_id = %listing.id, state = %state, "Message processed")
        }
        ProcessOutcome::NoChanges { listing_id } => {
            debug!(listing_id = %listing_id, "Message processed, no changes")
        }
        ProcessOutcome::Extracted { .. } => debug!("Message without listing id processed"),
    }
}
