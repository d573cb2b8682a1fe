//! Listing types - extracted fields, stored documents, and transitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::checksum::{fingerprint_of, text_fingerprint};

/// Fields returned by the enrichment collaborator, keyed by field name.
pub type Enrichment = BTreeMap<String, Value>;

/// Names that enrichment output may never overwrite.
const RESERVED_FIELDS: &[&str] = &[
    "_id",
    "check_sum_json",
    "check_sum_description",
    "headline",
    "address",
    "price",
    "description",
    "photos",
    "parking",
    "no_smoking",
    "laundry_facilities",
    "cooking_facilities",
    "category",
    "date_available",
    "date_posted",
    "shared",
    "sublet",
    "beds",
];

/// Structured fields of one listing.
///
/// Optional fields are omitted from the serialized document when absent,
/// never written as `null`. Feature flags always carry a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Photo URLs in source order, deduplicated
    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default)]
    pub parking: bool,

    #[serde(default)]
    pub no_smoking: bool,

    #[serde(default)]
    pub laundry_facilities: bool,

    #[serde(default)]
    pub cooking_facilities: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sublet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<String>,

    /// Enrichment-only fields (demographic, term_length, furnished, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ListingFields {
    /// Description text, or the empty string when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Compute both fingerprints for this field set.
    pub fn checksums(&self) -> Checksums {
        Checksums {
            json: fingerprint_of(self),
            description: text_fingerprint(self.description_text()),
        }
    }

    /// Merge enrichment output into the extension map.
    ///
    /// Keys that name an extracted field are dropped; the extracted value wins.
    pub fn merge_enrichment(&mut self, enrichment: Enrichment) {
        for (key, value) in enrichment {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                tracing::debug!(
                    field = %key,
                    "Dropping enrichment field that shadows an extracted field"
                );
                continue;
            }
            self.extra.insert(key, value);
        }
    }
}

/// The pair of fingerprints stored alongside every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksums {
    pub json: u32,
    pub description: u32,
}

/// A listing as persisted in the store.
///
/// Both checksums are mandatory, so a stored listing can never lack them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredListing {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub fields: ListingFields,

    pub check_sum_json: u32,

    pub check_sum_description: u32,
}

impl StoredListing {
    pub fn new(id: impl Into<String>, fields: ListingFields, checksums: Checksums) -> Self {
        Self {
            id: id.into(),
            fields,
            check_sum_json: checksums.json,
            check_sum_description: checksums.description,
        }
    }

    pub fn checksums(&self) -> Checksums {
        Checksums {
            json: self.check_sum_json,
            description: self.check_sum_description,
        }
    }

    /// Apply a field-level merge: every field the update carries overwrites,
    /// everything else is kept.
    pub fn apply(&mut self, update: &ListingUpdate) -> Result<(), serde_json::Error> {
        let mut current = serde_json::to_value(&self.fields)?;
        let patch = serde_json::to_value(&update.fields)?;
        if let (Value::Object(current), Value::Object(patch)) = (&mut current, patch) {
            for (key, value) in patch {
                current.insert(key, value);
            }
        }
        self.fields = serde_json::from_value(current)?;
        self.check_sum_json = update.checksums.json;
        self.check_sum_description = update.checksums.description;
        Ok(())
    }
}

/// A field-level merge update against an existing listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingUpdate {
    pub fields: ListingFields,
    pub checksums: Checksums,
}

/// Classification of a listing against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingState {
    New,
    Unchanged,
    Updated,
    Orphaned,
}

impl std::fmt::Display for ListingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Unchanged => "unchanged",
            Self::Updated => "updated",
            Self::Orphaned => "orphaned",
        };
        f.write_str(s)
    }
}
