//! Discovery: walks the paginated listing index and queues every listing page.
//!
//! Index pages are fetched one after another from page 1. The crawl ends at
//! the first run of `empty_page_tolerance` consecutive pages without a
//! listing link, or at a 404 past the first page. Fetch and publish failures
//! for a single listing are logged and skipped; any other index page failure
//! ends the crawl and marks it incomplete.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::CollaboratorError;
use crate::traits::fetcher::PageFetcher;
use crate::traits::queue::ListingQueue;
use crate::types::{OrderedSet, QueueMessage, DEFAULT_PRODUCER};

lazy_static! {
    static ref LINK: Selector = Selector::parse("a[href]").expect("static selector must parse");
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Site root, without trailing slash
    pub base_url: String,
    /// Stop after this many index pages. Hitting the cap marks the crawl incomplete.
    pub max_pages: Option<u32>,
    /// Consecutive link-less pages that end the crawl
    pub empty_page_tolerance: u32,
    pub producer: String,
}

impl DiscoveryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_pages: None,
            empty_page_tolerance: 1,
            producer: DEFAULT_PRODUCER.to_string(),
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_empty_page_tolerance(mut self, tolerance: u32) -> Self {
        self.empty_page_tolerance = tolerance.max(1);
        self
    }

    pub fn index_url(&self, page: u32) -> String {
        format!("{}/housing/page/{}", self.base_url, page)
    }

    pub fn listing_prefix(&self) -> String {
        format!("{}/classified/housing", self.base_url)
    }
}

/// What one crawl observed.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Every listing id linked from the index, in first-seen order
    pub seen_ids: OrderedSet<String>,
    pub published: usize,
    pub failed: usize,
    /// Index pages fetched
    pub pages: u32,
    /// `false` when the crawl stopped before reaching the end of the index
    pub complete: bool,
}

pub struct Discovery {
    fetcher: Arc<dyn PageFetcher>,
    queue: Arc<dyn ListingQueue>,
    config: DiscoveryConfig,
}

impl Discovery {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        queue: Arc<dyn ListingQueue>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            fetcher,
            queue,
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub async fn crawl(&self) -> CrawlResult {
        let prefix = self.config.listing_prefix();
        let mut result = CrawlResult {
            complete: true,
            ..Default::default()
        };
        let mut empty_streak = 0;
        let mut page = 1;

        loop {
            if self.config.max_pages.is_some_and(|max| page > max) {
                info!(pages = result.pages, "Page cap reached, stopping crawl");
                result.complete = false;
                break;
            }

            let url = self.config.index_url(page);
            info!(page, url = %url, "Fetching index page");
            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                // Paginated indexes answer 404 past their last page
                Err(CollaboratorError::HttpStatus { status: 404, .. }) if page > 1 => {
                    info!(page, "Index exhausted");
                    break;
                }
                Err(e) => {
                    warn!(page, url = %url, error = %e, "Index page fetch failed, stopping crawl");
                    result.complete = false;
                    break;
                }
            };
            result.pages += 1;

            let links = listing_links(&html, &prefix);
            if links.is_empty() {
                empty_streak += 1;
                debug!(page, empty_streak, "Index page has no listing links");
                if empty_streak >= self.config.empty_page_tolerance.max(1) {
                    break;
                }
                page += 1;
                continue;
            }
            empty_streak = 0;

            for link in links {
                let Some(id) = listing_id_from_url(&link) else {
                    debug!(link = %link, "Listing link has no id segment");
                    continue;
                };
                if !result.seen_ids.insert(id.to_string()) {
                    continue;
                }
                debug!(page, listing_id = %id, link = %link, "Found listing");

                if self.forward(id, &link).await {
                    result.published += 1;
                } else {
                    result.failed += 1;
                }
            }

            page += 1;
        }

        info!(
            pages = result.pages,
            listings = result.seen_ids.len(),
            published = result.published,
            failed = result.failed,
            complete = result.complete,
            "Crawl finished"
        );
        result
    }

    /// Fetch one listing page and queue it. Failures are logged, never raised.
    async fn forward(&self, id: &str, link: &str) -> bool {
        let html = match self.fetcher.fetch(link).await {
            Ok(html) => html,
            Err(e) => {
                warn!(listing_id = %id, link = %link, error = %e, "Listing fetch failed");
                return false;
            }
        };

        let message = QueueMessage::new(id, html, self.config.producer.clone());
        match self.queue.publish(&message).await {
            Ok(()) => {
                debug!(listing_id = %id, "Listing queued");
                true
            }
            Err(e) => {
                warn!(listing_id = %id, error = %e, "Listing publish failed");
                false
            }
        }
    }
}

/// Hrefs on an index page that point at a listing, in document order.
pub fn listing_links(html: &str, prefix: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// Final path segment of a listing URL, ignoring trailing slashes and whitespace.
pub fn listing_id_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
