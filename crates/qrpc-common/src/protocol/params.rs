//! Ordered multi-valued call parameters.

use serde_json::{Map, Value};

/// Ordered multi-map of string keys to string values.
///
/// Holds query/form style parameters of a call. Keys keep the order in which
/// they were first added and each key may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiMap {
    entries: Vec<(String, Vec<String>)>,
}

impl MultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`, keeping any values already present.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Builder form of [`MultiMap::add`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// First value stored under `key`.
    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// JSON object view: single values become strings, repeated values arrays.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (key, values) in &self.entries {
            let value = match values.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            object.insert(key.clone(), value);
        }
        Value::Object(object)
    }

    /// Builds a multi-map from a JSON object. Scalars are stringified and
    /// arrays contribute one value per element; anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut params = MultiMap::new();
        for (key, value) in object {
            match value {
                Value::Array(items) => {
                    for item in items {
                        params.add(key.clone(), scalar_to_string(item)?);
                    }
                }
                other => params.add(key.clone(), scalar_to_string(other)?),
            }
        }
        Some(params)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MultiMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = MultiMap::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_keeps_insertion_order_and_multiple_values() {
        let params = MultiMap::new()
            .with("b", "1")
            .with("a", "2")
            .with("b", "3");

        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(params.get_all("b"), &["1".to_string(), "3".to_string()]);
        assert_eq!(params.get_first("b"), Some("1"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_missing_key() {
        let params = MultiMap::new();
        assert!(!params.contains_key("q"));
        assert_eq!(params.get_first("q"), None);
        assert!(params.get_all("q").is_empty());
    }

    #[test]
    fn test_to_json() {
        let params: MultiMap = [("q", "5"), ("tag", "x"), ("tag", "y")].into_iter().collect();
        assert_eq!(params.to_json(), json!({"q": "5", "tag": ["x", "y"]}));
    }

    #[test]
    fn test_from_json_rejects_nested_objects() {
        assert!(MultiMap::from_json(&json!({"a": {"b": 1}})).is_none());
        let params = MultiMap::from_json(&json!({"n": 1, "flag": true})).unwrap();
        assert_eq!(params.get_first("n"), Some("1"));
        assert_eq!(params.get_first("flag"), Some("true"));
    }
}
