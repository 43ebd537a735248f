//! Key lookup over dashboard JSON payloads.
//!
//! Node payloads nest their per-severity counters at depths that differ
//! between dashboard releases. [`find_first`] locates a key anywhere in a
//! value; [`find_at`] resolves a known JSON pointer. Callers that know the
//! exact location should prefer [`find_at`].

use serde_json::Value;

/// Depth-first search for the first value stored under `key`
///
/// An object's own members are checked before descending into its
/// children, so a shallower match always beats a deeper one in the same
/// object. Children are visited in map iteration order and arrays element
/// by element.
pub fn find_first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|child| find_first(child, key))
        }
        Value::Array(items) => items.iter().find_map(|item| find_first(item, key)),
        _ => None,
    }
}

/// Resolve an RFC 6901 JSON pointer such as `/system-state/hostname`
pub fn find_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a Value> {
    value.pointer(pointer)
}

/// First `key` anywhere in `value`, read as an unsigned counter
pub fn find_u64(value: &Value, key: &str) -> Option<u64> {
    find_first(value, key).and_then(Value::as_u64)
}

/// First `key` anywhere in `value`, read as text
pub fn find_text(value: &Value, key: &str) -> Option<String> {
    find_first(value, key).and_then(value_text)
}

/// Text form of a scalar or nested value; `null` has none
///
/// Strings are returned as-is, anything else as its JSON rendering.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
