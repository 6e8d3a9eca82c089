//! HTTP parameter pollution guard.
//!
//! # Responsibilities
//! - Collapse repeated parameters to their last value
//! - Leave whitelisted parameters as arrays
//! - Keep what was collapsed so handlers can still inspect it

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Collapses repeated top-level parameters outside a whitelist.
#[derive(Debug, Clone, Default)]
pub struct PollutionGuard {
    whitelist: HashSet<String>,
}

impl PollutionGuard {
    pub fn new<I, S>(whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: whitelist.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_whitelisted(&self, key: &str) -> bool {
        self.whitelist.contains(key)
    }

    /// Collapse arrays in `params` in place.
    ///
    /// Returns the original values of every key that was collapsed.
    pub fn collapse(&self, params: &mut Map<String, Value>) -> Map<String, Value> {
        let mut polluted = Map::new();

        let keys: Vec<String> = params
            .iter()
            .filter(|(key, value)| value.is_array() && !self.is_whitelisted(key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in keys {
            let Some(original) = params.remove(&key) else {
                continue;
            };
            if let Some(last) = original.as_array().and_then(|items| items.last()).cloned() {
                params.insert(key.clone(), last);
            }
            polluted.insert(key, original);
        }

        polluted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guard() -> PollutionGuard {
        PollutionGuard::new(["duration", "price"])
    }

    #[test]
    fn test_whitelisted_keys_stay_arrays() {
        let mut params = json!({ "price": ["397", "497"], "duration": "5" })
            .as_object()
            .cloned()
            .unwrap();

        let polluted = guard().collapse(&mut params);
        assert!(polluted.is_empty());
        assert_eq!(params["price"], json!(["397", "497"]));
        assert_eq!(params["duration"], "5");
    }

    #[test]
    fn test_other_keys_collapse_to_last() {
        let mut params = json!({ "sort": ["price", "duration"], "name": "x" })
            .as_object()
            .cloned()
            .unwrap();

        let polluted = guard().collapse(&mut params);
        assert_eq!(params["sort"], "duration");
        assert_eq!(params["name"], "x");
        assert_eq!(polluted["sort"], json!(["price", "duration"]));
    }

    #[test]
    fn test_empty_array_is_dropped() {
        let mut params = json!({ "sort": [] }).as_object().cloned().unwrap();

        guard().collapse(&mut params);
        assert!(!params.contains_key("sort"));
    }
}
