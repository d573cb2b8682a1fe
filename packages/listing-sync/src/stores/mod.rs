//! Storage implementations for listings.
//!
//! - `MemoryStore`: in-memory, for tests and local runs
//! - `PostgresStore`: production backend (JSONB documents)

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
