//! Page fetch implementations.

pub mod http;

pub use http::HttpFetcher;
