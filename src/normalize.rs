//! Normalization of multi-valued backend fields.
//!
//! The responsible-party field is free text on most sites: usually a JSON
//! array serialized into a string, sometimes already an array, sometimes junk.
//! Anything that does not parse into an array counts as "not responsible".

use serde_json::Value;

/// Whether `identity` is listed in the raw responsible-party value.
///
/// Matching is case-insensitive and ignores surrounding whitespace on both
/// sides. Never fails.
pub fn is_responsible_for(raw: Option<&Value>, identity: &str) -> bool {
    let Some(raw) = raw else {
        return false;
    };

    let parsed;
    let items = match raw {
        Value::Array(items) => items,
        Value::String(text) => {
            if text.trim().is_empty() {
                return false;
            }
            parsed = match serde_json::from_str::<Value>(text) {
                Ok(value) => value,
                Err(_) => return false,
            };
            match &parsed {
                Value::Array(items) => items,
                _ => return false,
            }
        }
        _ => return false,
    };

    let target = normalize_identity(identity);
    items
        .iter()
        .any(|item| normalize_identity(&element_text(item)) == target)
}

/// Trimmed, lowercased form used for identity comparisons.
pub fn normalize_identity(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Replace every character that is not ASCII alphanumeric with `_`.
pub fn file_token(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

fn element_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
