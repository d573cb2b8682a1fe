pub mod listing;
pub mod message;
pub mod ordered_set;

pub use listing::{Checksums, Enrichment, ListingFields, ListingState, ListingUpdate, StoredListing};
pub use message::{ProcessRequest, QueueMessage, DEFAULT_PRODUCER};
pub use ordered_set::OrderedSet;
