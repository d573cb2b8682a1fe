//! HTML fixtures and collaborator wiring shared by the integration tests.

#![allow(dead_code)]

use listing_sync::testing::{MockFetcher, MockFieldExtractor, MockQueue};
use listing_sync::{MemoryStore, SyncDeps};
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "https://thecannon.ca";

pub const DESCRIPTION: &str = "Looking for a sublet January-August 2026. Single bedroom in a 2 people \
girls basement apartment. Will be fully furnished. 5 min drive from the University of Guelph Campus.";

pub const PHOTOS: [&str; 4] = [
    "https://thecannon.ca/wp-content/uploads/2025/11/user_19585_img_6359.jpg",
    "https://thecannon.ca/wp-content/uploads/2025/11/user_19585_img_6361.jpg",
    "https://thecannon.ca/wp-content/uploads/2025/11/user_19585_img_6362.jpg",
    "https://thecannon.ca/wp-content/uploads/2025/11/user_19585_img_6364.jpg",
];

/// Listing page with every field present.
pub fn listing_html(description: &str, price: &str) -> String {
    let photos: String = PHOTOS
        .iter()
        .map(|url| format!(r#"<a href="{url}"><img src="{url}?w=150" alt=""></a>"#))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>11 Smart St, Guelph | The Cannon</title></head>
<body>
  <header><h1>The Cannon</h1></header>
  <main>
    <h1>11 Smart St, Guelph</h1>
    <dl class="classified-details housing">
      <div class="row space-between">
        <span class="md">11 Smart Street, Guelph, ON, Canada</span>
        <strong>{price}</strong>
      </div>
      <div class="well">
        <div class="row">
          <div><dt>Category</dt><dd>Apartment or Condo</dd></div>
          <div><dt>Date Available</dt><dd>1/Jan/2025</dd></div>
          <div><dt>Date Posted</dt><dd>7/Nov/2025</dd></div>
        </div>
        <div class="row">
          <div><dt>Shared</dt><dd>Yes</dd></div>
          <div><dt>Sublet</dt><dd>Yes</dd></div>
          <div><dt>Beds</dt><dd>1</dd></div>
        </div>
      </div>
      <dt>Description</dt>
      <dd class="description">
        {description}
      </dd>
      <ul class="housing-features">
        <li><img src="/icons/parking.svg" alt=""><span class="tooltip">Parking</span></li>
        <li><img src="/icons/smoke.svg" alt=""><span class="tooltip">No Smoking</span></li>
        <li><img src="/icons/laundry.svg" alt=""><span class="tooltip">Laundry Facilities</span></li>
        <li><img src="/icons/cooking.svg" alt=""><span class="tooltip">Cooking Facilities</span></li>
      </ul>
      <div id="photos">{photos}</div>
    </dl>
  </main>
</body>
</html>"#
    )
}

/// The standard fixture listing.
pub fn default_listing_html() -> String {
    listing_html(DESCRIPTION, "$1100")
}

/// Index page linking to the given listing ids, plus some unrelated links.
pub fn index_html(ids: &[&str]) -> String {
    let links: String = ids
        .iter()
        .map(|id| {
            format!(r#"<article><a href="{BASE_URL}/classified/housing/{id}/">Listing {id}</a></article>"#)
        })
        .collect();
    format!(
        r#"<html><body>
             <nav><a href="{BASE_URL}/classified/jobs/">Jobs</a><a href="{BASE_URL}/housing/page/9/">Next</a></nav>
             {links}
           </body></html>"#
    )
}

pub fn index_url(page: u32) -> String {
    format!("{BASE_URL}/housing/page/{page}")
}

pub fn listing_url(id: &str) -> String {
    format!("{BASE_URL}/classified/housing/{id}/")
}

/// Collaborators for one test, with handles kept for assertions.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub fetcher: Arc<MockFetcher>,
    pub queue: Arc<MockQueue>,
    pub enricher: Arc<MockFieldExtractor>,
    pub deps: SyncDeps,
}

impl Harness {
    pub fn new(store: MemoryStore, fetcher: MockFetcher, enricher: MockFieldExtractor) -> Self {
        Self::with_queue(store, fetcher, MockQueue::new(), enricher)
    }

    pub fn with_queue(
        store: MemoryStore,
        fetcher: MockFetcher,
        queue: MockQueue,
        enricher: MockFieldExtractor,
    ) -> Self {
        let store = Arc::new(store);
        let fetcher = Arc::new(fetcher);
        let queue = Arc::new(queue);
        let enricher = Arc::new(enricher);
        let deps = SyncDeps::new(
            fetcher.clone(),
            store.clone(),
            queue.clone(),
            enricher.clone(),
        )
        .with_timeouts(Duration::from_millis(200), Duration::from_secs(1));

        Self {
            store,
            fetcher,
            queue,
            enricher,
            deps,
        }
    }

    /// Empty store, no pages, enrichment answering `{}`.
    pub fn empty() -> Self {
        Self::new(MemoryStore::new(), MockFetcher::new(), MockFieldExtractor::new())
    }
}
