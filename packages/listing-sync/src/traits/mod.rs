//! Collaborator contracts the pipeline depends on.

pub mod enricher;
pub mod fetcher;
pub mod queue;
pub mod store;
