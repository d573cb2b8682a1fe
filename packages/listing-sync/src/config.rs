use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nats_url: String,
    pub queue_subject: String,
    pub queue_group: String,
    pub source_base_url: String,
    /// Enrichment is disabled when unset
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub http_timeout: Duration,
    pub enrichment_timeout: Duration,
    pub store_timeout: Duration,
    pub crawl_max_pages: Option<u32>,
    pub crawl_empty_page_tolerance: u32,
    pub worker_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            nats_url: var_or("NATS_URL", "nats://localhost:4222"),
            queue_subject: var_or("QUEUE_SUBJECT", "listings.html"),
            queue_group: var_or("QUEUE_GROUP", "builders"),
            source_base_url: var_or("SOURCE_BASE_URL", "https://thecannon.ca"),
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_model: var_or("OPENAI_MODEL", "gpt-4o-mini"),
            http_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 30)?),
            enrichment_timeout: Duration::from_secs(parse_or("ENRICHMENT_TIMEOUT_SECS", 20)?),
            store_timeout: Duration::from_secs(parse_or("STORE_TIMEOUT_SECS", 10)?),
            crawl_max_pages: parse_opt("CRAWL_MAX_PAGES")?,
            crawl_empty_page_tolerance: parse_or("CRAWL_EMPTY_PAGE_TOLERANCE", 1)?,
            worker_concurrency: parse_or("WORKER_CONCURRENCY", 4)?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_opt(key)?.unwrap_or(default))
}

fn parse_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} must be a valid number")),
        _ => Ok(None),
    }
}
