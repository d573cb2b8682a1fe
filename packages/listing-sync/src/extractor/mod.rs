//! Listing extractor - turns one listing page's markup into [`ListingFields`].
//!
//! Everything hangs off the anchor block (`dl.classified-details.housing`).
//! Its absence is the only failure; every other field is optional and is
//! simply omitted when the page does not carry it. Feature flags are the
//! exception: they are always present, `false` when the feature is not listed.
//!
//! Extraction is a pure function of its input and holds no shared state, so
//! it can run on any number of workers at once. `scraper::Html` is not
//! `Send`; the parsed document never outlives [`ListingExtractor::extract`].

pub mod aliases;

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::ExtractionError;
use crate::types::{ListingFields, OrderedSet};

pub use aliases::{field_aliases, FeatureFlag, MetadataField};

/// Selector for the block that must hold the listing details.
pub const ANCHOR_SELECTOR: &str = "dl.classified-details.housing";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

lazy_static! {
    static ref ANCHOR: Selector = selector(ANCHOR_SELECTOR);
    static ref HEADLINE_OR_ANCHOR: Selector = selector("h1, dl.classified-details.housing");
    static ref PRIMARY_ROW: Selector = selector(".row.space-between");
    static ref ADDRESS: Selector = selector(".md");
    static ref PRICE: Selector = selector("strong");
    static ref DESCRIPTION: Selector = selector("dd.description");
    static ref METADATA_ROW: Selector = selector(".well .row");
    static ref TERM: Selector = selector("dt");
    static ref DEFINITION: Selector = selector("dd");
    static ref PHOTO_LINK: Selector = selector("#photos a[href]");
    static ref PHOTO_IMAGE: Selector = selector("#photos img[src]");
    static ref FEATURE_ITEM: Selector = selector(".housing-features li");
    static ref TOOLTIP: Selector = selector(".tooltip");
    static ref IMAGE: Selector = selector("img");
}

/// Extracts listing fields from listing page HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingExtractor;

impl ListingExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse one listing page.
    pub fn extract(&self, html: &str) -> Result<ListingFields, ExtractionError> {
        let document = Html::parse_document(html);

        let root = document
            .select(&ANCHOR)
            .next()
            .ok_or(ExtractionError::AnchorMissing {
                selector: ANCHOR_SELECTOR,
            })?;

        let mut fields = ListingFields {
            headline: headline(&document, root),
            description: first_text(root, &DESCRIPTION),
            photos: photos(root),
            ..Default::default()
        };

        if let Some(row) = root.select(&PRIMARY_ROW).next() {
            fields.address = first_text(row, &ADDRESS);
            fields.price = first_text(row, &PRICE);
        }

        let features = feature_set(root);
        for flag in FeatureFlag::ALL {
            let present = features.contains(&flag.label().to_lowercase());
            match flag {
                FeatureFlag::Parking => fields.parking = present,
                FeatureFlag::NoSmoking => fields.no_smoking = present,
                FeatureFlag::LaundryFacilities => fields.laundry_facilities = present,
                FeatureFlag::CookingFacilities => fields.cooking_facilities = present,
            }
        }

        let mut metadata = metadata_pairs(root);
        for field in MetadataField::ALL {
            let value = metadata.remove(field.label());
            match field {
                MetadataField::Category => fields.category = value,
                MetadataField::DateAvailable => fields.date_available = value,
                MetadataField::DatePosted => fields.date_posted = value,
                MetadataField::Shared => fields.shared = value,
                MetadataField::Sublet => fields.sublet = value,
                MetadataField::Beds => fields.beds = value,
            }
        }

        debug!(
            photos = fields.photos.len(),
            unmapped_labels = metadata.len(),
            "Extracted listing fields"
        );

        Ok(fields)
    }
}

/// Whitespace-collapsed text of an element, `None` when it has none.
fn normalized_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(normalized_text)
}

/// Nearest `h1` preceding the anchor block in document order.
fn headline(document: &Html, anchor: ElementRef<'_>) -> Option<String> {
    let mut nearest = None;
    for element in document.select(&HEADLINE_OR_ANCHOR) {
        if element.id() == anchor.id() {
            break;
        }
        if element.value().name() == "h1" {
            nearest = Some(element);
        }
    }
    nearest.and_then(normalized_text)
}

/// Label/value pairs from the metadata rows. Later labels overwrite earlier ones.
/// Both `dt` and `dd` must exist; an empty `dd` maps to `""`.
fn metadata_pairs(root: ElementRef<'_>) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for row in root.select(&METADATA_ROW) {
        let columns = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "div");

        for column in columns {
            let (Some(label), Some(value)) =
                (column.select(&TERM).next(), column.select(&DEFINITION).next())
            else {
                continue;
            };
            // A present label with a blank value still yields the field
            let Some(label) = normalized_text(label) else {
                continue;
            };
            pairs.insert(label, normalized_text(value).unwrap_or_default());
        }
    }
    pairs
}

/// Photo URLs: link targets first, image sources only when there are no links.
fn photos(root: ElementRef<'_>) -> Vec<String> {
    let mut urls = OrderedSet::new();
    urls.extend(attr_values(root, &PHOTO_LINK, "href"));
    if urls.is_empty() {
        urls.extend(attr_values(root, &PHOTO_IMAGE, "src"));
    }
    urls.into_vec()
}

fn attr_values<'a>(
    root: ElementRef<'a>,
    selector: &'a Selector,
    attr: &'a str,
) -> impl Iterator<Item = String> + 'a {
    root.select(selector)
        .filter_map(move |element| element.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Lower-cased tooltip texts and icon alt texts of the feature list.
fn feature_set(root: ElementRef<'_>) -> HashSet<String> {
    let mut features = HashSet::new();
    for item in root.select(&FEATURE_ITEM) {
        if let Some(text) = first_text(item, &TOOLTIP) {
            features.insert(text.to_lowercase());
        }
        let alt = item
            .select(&IMAGE)
            .next()
            .and_then(|image| image.value().attr("alt"))
            .map(str::trim)
            .filter(|alt| !alt.is_empty());
        if let Some(alt) = alt {
            features.insert(alt.to_lowercase());
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(details: &str) -> String {
        format!(
            r#"<html><body>
                <h1>Old heading</h1>
                <h1>  12 Example   St, Guelph </h1>
                <dl class="classified-details housing">{details}</dl>
                <h1>After the block</h1>
            </body></html>"#
        )
    }

    #[test]
    fn test_missing_anchor_is_an_error() {
        let result = ListingExtractor::new().extract("<html><body><h1>Hi</h1></body></html>");
        assert!(matches!(result, Err(ExtractionError::AnchorMissing { .. })));
    }

    #[test]
    fn test_headline_is_nearest_preceding_h1() {
        let fields = ListingExtractor::new().extract(&page("")).unwrap();
        assert_eq!(fields.headline.as_deref(), Some("12 Example St, Guelph"));
    }

    #[test]
    fn test_empty_block_yields_defaults_only() {
        let fields = ListingExtractor::new().extract(&page("")).unwrap();
        assert_eq!(fields.address, None);
        assert_eq!(fields.price, None);
        assert_eq!(fields.description, None);
        assert_eq!(fields.category, None);
        assert!(fields.photos.is_empty());
        assert!(!fields.parking);
        assert!(!fields.cooking_facilities);
    }

    #[test]
    fn test_address_and_price_are_independent() {
        let html = page(r#"<div class="row space-between"><strong>$900</strong></div>"#);
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert_eq!(fields.price.as_deref(), Some("$900"));
        assert_eq!(fields.address, None);
    }

    #[test]
    fn test_feature_alt_text_counts_case_insensitively() {
        let html = page(
            r#"<ul class="housing-features">
                 <li><img src="p.png" alt=" PARKING "></li>
                 <li><span class="tooltip">no smoking</span></li>
               </ul>"#,
        );
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert!(fields.parking);
        assert!(fields.no_smoking);
        assert!(!fields.laundry_facilities);
    }

    #[test]
    fn test_image_sources_are_fallback_only() {
        let html = page(
            r#"<div id="photos">
                 <img src="https://img/1.jpg"><img src="https://img/1.jpg"><img src=" https://img/2.jpg ">
               </div>"#,
        );
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert_eq!(fields.photos, vec!["https://img/1.jpg", "https://img/2.jpg"]);

        let html = page(
            r#"<div id="photos">
                 <a href="https://img/big.jpg"><img src="https://img/thumb.jpg"></a>
               </div>"#,
        );
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert_eq!(fields.photos, vec!["https://img/big.jpg"]);
    }

    #[test]
    fn test_blank_metadata_value_is_kept_as_empty_string() {
        let html = page(
            r#"<div class="well"><div class="row">
                 <div><dt>Beds</dt><dd></dd></div>
                 <div><dt>Shared</dt><dd>   </dd></div>
                 <div><dt>Sublet</dt></div>
               </div></div>"#,
        );
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert_eq!(fields.beds.as_deref(), Some(""));
        assert_eq!(fields.shared.as_deref(), Some(""));
        assert_eq!(fields.sublet, None);

        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["beds"], serde_json::json!(""));
        assert!(value.get("sublet").is_none());
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let html = page(
            r#"<div class="well"><div class="row">
                 <div><dt>Pets</dt><dd>Yes</dd></div>
                 <div><dt>Beds</dt><dd> 2 </dd></div>
               </div></div>"#,
        );
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert_eq!(fields.beds.as_deref(), Some("2"));
        assert!(fields.extra.is_empty());
    }
}
