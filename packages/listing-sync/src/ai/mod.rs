//! Field-extraction service implementations.

mod openai;

pub use openai::OpenAIFieldExtractor;
