//! Extended decoding of URL-encoded data.
//!
//! Used for query strings and `application/x-www-form-urlencoded` bodies.
//!
//! ```text
//! a=1&a=2        → { "a": ["1", "2"] }
//! a[b]=1         → { "a": { "b": "1" } }
//! a[]=1          → { "a": ["1"] }
//! ```
//!
//! Only one level of brackets is understood; deeper keys are kept literally.

use serde_json::{Map, Value};

use crate::error::AppError;

enum KeyPath<'a> {
    Plain(&'a str),
    Nested(&'a str, &'a str),
    Push(&'a str),
}

fn split_key(key: &str) -> KeyPath<'_> {
    let Some(open) = key.find('[') else {
        return KeyPath::Plain(key);
    };
    if open == 0 || !key.ends_with(']') {
        return KeyPath::Plain(key);
    }

    let base = &key[..open];
    let inner = &key[open + 1..key.len() - 1];
    if inner.contains('[') || inner.contains(']') {
        KeyPath::Plain(key)
    } else if inner.is_empty() {
        KeyPath::Push(base)
    } else {
        KeyPath::Nested(base, inner)
    }
}

/// Insert `value` under `key`, turning repeated keys into arrays.
fn append(map: &mut Map<String, Value>, key: &str, value: Value) {
    match map.get_mut(key) {
        None => {
            map.insert(key.to_owned(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
    }
}

/// Decode already percent-decoded pairs into a value tree.
pub fn decode_pairs(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();

    for (key, value) in pairs {
        match split_key(&key) {
            KeyPath::Plain(key) => append(&mut map, key, Value::String(value)),
            KeyPath::Push(base) => match map.get_mut(base) {
                Some(Value::Array(items)) => items.push(Value::String(value)),
                Some(_) => append(&mut map, base, Value::String(value)),
                None => {
                    map.insert(base.to_owned(), Value::Array(vec![Value::String(value)]));
                }
            },
            KeyPath::Nested(base, inner) => match map.get_mut(base) {
                Some(Value::Object(nested)) => append(nested, inner, Value::String(value)),
                Some(_) => {
                    let mut nested = Map::new();
                    nested.insert(inner.to_owned(), Value::String(value));
                    append(&mut map, base, Value::Object(nested));
                }
                None => {
                    let mut nested = Map::new();
                    nested.insert(inner.to_owned(), Value::String(value));
                    map.insert(base.to_owned(), Value::Object(nested));
                }
            },
        }
    }

    map
}

/// Decode a raw `application/x-www-form-urlencoded` string.
pub fn parse_urlencoded(raw: &str) -> Result<Map<String, Value>, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|e| AppError::bad_request(format!("Malformed URL-encoded data: {e}")))?;
    Ok(decode_pairs(pairs))
}
