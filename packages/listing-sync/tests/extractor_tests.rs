//! Extraction against full listing pages.

mod common;

use common::*;
use listing_sync::{ExtractionError, ListingExtractor};

#[test]
fn extracts_every_field_from_full_listing() {
    let fields = ListingExtractor::new()
        .extract(&default_listing_html())
        .unwrap();

    assert_eq!(fields.headline.as_deref(), Some("11 Smart St, Guelph"));
    assert_eq!(
        fields.address.as_deref(),
        Some("11 Smart Street, Guelph, ON, Canada")
    );
    assert_eq!(fields.price.as_deref(), Some("$1100"));
    assert_eq!(fields.description.as_deref(), Some(DESCRIPTION));
    assert_eq!(fields.category.as_deref(), Some("Apartment or Condo"));
    assert_eq!(fields.date_available.as_deref(), Some("1/Jan/2025"));
    assert_eq!(fields.date_posted.as_deref(), Some("7/Nov/2025"));
    assert_eq!(fields.shared.as_deref(), Some("Yes"));
    assert_eq!(fields.sublet.as_deref(), Some("Yes"));
    assert_eq!(fields.beds.as_deref(), Some("1"));
    assert_eq!(fields.photos, PHOTOS.to_vec());
    assert!(fields.parking);
    assert!(fields.no_smoking);
    assert!(fields.laundry_facilities);
    assert!(fields.cooking_facilities);
}

#[test]
fn parking_tooltip_matches_in_any_case() {
    for label in ["Parking", "PARKING", "parking", "  pArKiNg "] {
        let html = default_listing_html().replace(
            r#"<span class="tooltip">Parking</span>"#,
            &format!(r#"<span class="tooltip">{label}</span>"#),
        );
        let fields = ListingExtractor::new().extract(&html).unwrap();
        assert!(fields.parking, "label {label:?} should set parking");
    }
}

#[test]
fn missing_parking_tooltip_is_false_not_absent() {
    let html = default_listing_html().replace(
        r#"<span class="tooltip">Parking</span>"#,
        r#"<span class="tooltip">Balcony</span>"#,
    );
    let fields = ListingExtractor::new().extract(&html).unwrap();
    assert!(!fields.parking);

    let value = serde_json::to_value(&fields).unwrap();
    assert_eq!(value["parking"], serde_json::json!(false));
}

#[test]
fn page_without_details_block_is_rejected() {
    let html = default_listing_html().replace("classified-details housing", "classified-details");
    let result = ListingExtractor::new().extract(&html);
    assert!(matches!(result, Err(ExtractionError::AnchorMissing { .. })));
}

#[test]
fn duplicate_photo_links_keep_first_occurrence() {
    let duplicate = format!(r#"<a href="{}"></a></div>"#, PHOTOS[0]);
    let html = default_listing_html().replacen(
        r#"</div>
    </dl>"#,
        &format!("{duplicate}\n    </dl>"),
        1,
    );
    let fields = ListingExtractor::new().extract(&html).unwrap();
    assert_eq!(fields.photos, PHOTOS.to_vec());
}

#[test]
fn extraction_is_deterministic() {
    let extractor = ListingExtractor::new();
    let html = default_listing_html();
    let first = extractor.extract(&html).unwrap();
    let second = extractor.extract(&html).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.checksums(), second.checksums());
}
