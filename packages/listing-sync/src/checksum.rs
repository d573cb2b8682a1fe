//! Deterministic content fingerprints for change detection.
//!
//! A document is first rendered in canonical JSON (keys sorted recursively,
//! `,`/`:` separators, non-ASCII escaped as `\uXXXX`) and then hashed with
//! 32-bit FNV-1a over its code points. The escaping keeps fingerprints
//! stable across writers that render JSON with `ensure_ascii` semantics.
//!
//! These are change detectors, not content addresses.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Render a JSON value in canonical form.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7E => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing to a String cannot fail
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// 32-bit FNV-1a over the code points of `text`.
pub fn fingerprint(text: &str) -> u32 {
    text.chars().fold(FNV_OFFSET_BASIS, |hash, c| {
        (hash ^ c as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Fingerprint of a structured document's canonical form.
pub fn document_fingerprint(value: &Value) -> u32 {
    fingerprint(&canonicalize(value))
}

/// Fingerprint of any serializable document.
///
/// Serialization of the crate's own field types cannot fail; a value that
/// does fail is fingerprinted as `null`.
pub fn fingerprint_of<T: Serialize>(doc: &T) -> u32 {
    let value = serde_json::to_value(doc).unwrap_or(Value::Null);
    document_fingerprint(&value)
}

/// Fingerprint of a plain string, without canonicalization.
pub fn text_fingerprint(s: &str) -> u32 {
    fingerprint(s)
}
