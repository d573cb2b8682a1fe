//! Typed errors for the listing sync pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). The three kinds map
//! onto the failure classes a caller has to tell apart:
//! - [`InputError`]: the message itself is unusable
//! - [`ExtractionError`]: the markup lacks the listing details block
//! - [`CollaboratorError`]: fetch, store, queue or enrichment failed

use thiserror::Error;

/// Boxed source error from an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Problems with a per-message payload. Surfaced before any side effect.
#[derive(Debug, Error)]
pub enum InputError {
    /// `html_content` key is missing or null
    #[error("no HTML content provided")]
    MissingHtml,

    /// `html_content` is present but not a string
    #[error("html_content must be a string")]
    HtmlNotString,

    /// `listing_id` is present but not a string
    #[error("listing_id must be a string")]
    ListingIdNotString,

    /// Payload is not a JSON object at all
    #[error("malformed message: {0}")]
    Malformed(String),
}

/// The listing markup could not be turned into a field map.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The anchor block holding the listing details is absent
    #[error("could not find listing details block ({selector})")]
    AnchorMissing { selector: &'static str },
}

/// An external collaborator was unreachable or answered with an unexpected shape.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Page fetch transport failed
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Page fetch returned a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Persistent store operation failed
    #[error("store error: {0}")]
    Store(#[source] BoxError),

    /// Queue publish or subscribe failed
    #[error("queue error: {0}")]
    Queue(#[source] BoxError),

    /// Field-extraction service failed
    #[error("enrichment service error: {0}")]
    Enrichment(#[source] BoxError),

    /// Collaborator did not answer within the configured timeout
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// Collaborator answered, but not with something we understand
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl CollaboratorError {
    pub fn store(err: impl Into<BoxError>) -> Self {
        Self::Store(err.into())
    }

    pub fn queue(err: impl Into<BoxError>) -> Self {
        Self::Queue(err.into())
    }

    pub fn enrichment(err: impl Into<BoxError>) -> Self {
        Self::Enrichment(err.into())
    }
}

/// Overall result of processing one unit of work.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Result type alias for collaborator-facing operations.
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Result type alias for whole-message processing.
pub type Result<T> = std::result::Result<T, SyncError>;
