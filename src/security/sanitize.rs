//! Input sanitizers for decoded request data.
//!
//! # Responsibilities
//! - Strip keys that a document store would read as query operators
//! - Neutralize markup in every string key and value
//!
//! # Design Decisions
//! - Operate on `serde_json::Value` trees in place, recursing through objects and arrays
//! - Operator keys: a leading `$` or any `.` (path traversal into sub-documents)
//! - Markup: `<` becomes `&lt;`, which is enough to stop a tag from opening

use std::borrow::Cow;

use serde_json::{Map, Value};

/// True for keys a document store would interpret as an operator or path.
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

/// Remove operator keys from `value`, returning how many were removed.
pub fn strip_operator_keys(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => strip_operator_keys_in_map(map),
        Value::Array(items) => items.iter_mut().map(strip_operator_keys).sum(),
        _ => 0,
    }
}

/// Map variant of [`strip_operator_keys`].
pub fn strip_operator_keys_in_map(map: &mut Map<String, Value>) -> usize {
    let before = map.len();
    map.retain(|key, _| !is_operator_key(key));
    let removed = before - map.len();

    removed + map.values_mut().map(strip_operator_keys).sum::<usize>()
}

/// Escape markup in a single string.
pub fn clean_xss(input: &str) -> Cow<'_, str> {
    if input.contains('<') {
        Cow::Owned(input.replace('<', "&lt;"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Escape markup in every string key and value of `value`.
pub fn clean_xss_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains('<') {
                *s = s.replace('<', "&lt;");
            }
        }
        Value::Array(items) => items.iter_mut().for_each(clean_xss_value),
        Value::Object(map) => clean_xss_map(map),
        _ => {}
    }
}

/// Map variant of [`clean_xss_value`].
pub fn clean_xss_map(map: &mut Map<String, Value>) {
    let entries = std::mem::take(map);
    for (key, mut value) in entries {
        clean_xss_value(&mut value);
        map.insert(clean_xss(&key).into_owned(), value);
    }
}
