//! Property checks for the fingerprinting functions.

use listing_sync::{canonicalize, document_fingerprint, fingerprint, text_fingerprint};
use proptest::prelude::*;
use serde_json::{Map, Value};

proptest! {
    #[test]
    fn fingerprint_ignores_key_insertion_order(
        entries in prop::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 0..12)
    ) {
        let forward: Map<String, Value> = entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let reverse: Map<String, Value> = entries
            .iter()
            .rev()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let forward = Value::Object(forward);
        let reverse = Value::Object(reverse);
        prop_assert_eq!(canonicalize(&forward), canonicalize(&reverse));
        prop_assert_eq!(document_fingerprint(&forward), document_fingerprint(&reverse));
    }

    #[test]
    fn single_character_edit_changes_fingerprint(
        text in "\\PC{1,64}",
        index in any::<prop::sample::Index>(),
        replacement in any::<char>(),
    ) {
        let chars: Vec<char> = text.chars().collect();
        let at = index.index(chars.len());
        prop_assume!(chars[at] != replacement);

        let mut edited = chars.clone();
        edited[at] = replacement;
        let edited: String = edited.into_iter().collect();

        prop_assert_ne!(text_fingerprint(&text), text_fingerprint(&edited));
    }

    #[test]
    fn canonical_form_is_ascii(text in "\\PC{0,32}") {
        let rendered = canonicalize(&Value::String(text));
        prop_assert!(rendered.is_ascii());
    }

    #[test]
    fn text_fingerprint_is_plain_fingerprint(text in ".{0,64}") {
        prop_assert_eq!(text_fingerprint(&text), fingerprint(&text));
    }
}
