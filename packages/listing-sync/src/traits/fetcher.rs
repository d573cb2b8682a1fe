//! Page fetch transport.

use async_trait::async_trait;

use crate::error::CollaboratorResult;

/// Fetches raw markup for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url`. Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> CollaboratorResult<String>;
}
