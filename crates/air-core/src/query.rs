//! Convenience builder for HTTP query parameters.
//!
//! List filters arrive as loosely typed JSON maps; this builder flattens them into the
//! string pairs expected on the wire.

use serde_json::{Map, Value};
use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Build parameters from a JSON object, skipping `null` values.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let mut params = Self::new();
        for (key, value) in map {
            params.push_json(key, value);
        }
        params
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key.to_string(), value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    /// Append a JSON value. Arrays repeat the key once per element.
    pub fn push_json(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) => self.push(key, s),
            Value::Array(items) => {
                for item in items {
                    self.push_json(key, item);
                }
            }
            other => self.push(key, other),
        }
    }

    /// Append a pair unless the key is already present.
    pub fn set_default<T>(&mut self, key: &str, value: T)
    where
        T: Display,
    {
        if !self.contains(key) {
            self.push(key, value);
        }
    }

    /// Returns true if a pair with this key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Borrow the collected pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;
    use serde_json::json;

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("name", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn from_json_flattens_values() {
        let map = json!({"simulation": "abc", "limit": 5, "archived": false, "skip": null});
        let params = QueryParams::from_json(map.as_object().unwrap());
        let mut pairs = params.into_pairs();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("archived".to_string(), "false".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("simulation".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn set_default_keeps_existing_value() {
        let mut params = QueryParams::new();
        params.push("limit", 10);
        params.set_default("limit", 200);
        params.set_default("offset", 0);
        assert_eq!(
            params.into_pairs(),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("offset".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn arrays_repeat_the_key() {
        let mut params = QueryParams::new();
        params.push_json("ids", &json!(["a", "b"]));
        assert_eq!(params.pairs().len(), 2);
    }
}
