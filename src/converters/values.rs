//! JSON value helpers shared by the builder and the validator

use serde_json::{Map, Value as JsonValue};

/// Case-insensitive name comparison (full Unicode lowercasing)
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
}

/// Look up `key` in a JSON object: exact match first, then case-insensitive.
///
/// Returns the key as spelled in the object along with its value.
pub fn lookup<'v>(object: &'v Map<String, JsonValue>, key: &str) -> Option<(&'v str, &'v JsonValue)> {
    if let Some((k, v)) = object.get_key_value(key) {
        return Some((k.as_str(), v));
    }
    object
        .iter()
        .find(|(k, _)| names_match(k, key))
        .map(|(k, v)| (k.as_str(), v))
}

/// Like [`lookup`], treating an explicit `null` as absent
pub fn lookup_present<'v>(object: &'v Map<String, JsonValue>, key: &str) -> Option<(&'v str, &'v JsonValue)> {
    lookup(object, key).filter(|(_, v)| !v.is_null())
}

/// Render a JSON value as element text or attribute value
pub fn scalar_text(value: &JsonValue, text_key: &str) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| scalar_text(item, text_key))
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::Object(object) => match lookup(object, text_key) {
            Some((_, text)) => scalar_text(text, text_key),
            None => value.to_string(),
        },
    }
}

/// Short description of a value's JSON kind, for messages
pub fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
