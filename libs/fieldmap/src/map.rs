use crate::error::{Error, Result};
use crate::value::Value;

/// Insertion-ordered string-keyed values.
///
/// Intermediate form between records and raw key/value data
/// (request parameters, `key=value` text, JSON objects).
/// Keys are unique; inserting an existing key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace. Returns the previous value for `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == &name) {
            Some(std::mem::replace(&mut entry.1, value))
        } else {
            self.entries.push((name, value));
            None
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Value for `name`, or `Value::Null` when absent.
    pub fn get_or_null(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validity guard used at conversion entry: a map must be non-empty.
    pub fn is_valid(&self) -> bool {
        !self.is_empty()
    }

    /// Parse `key=value;key=value` text with the default separators.
    pub fn parse_pairs_default(text: &str) -> Result<Self> {
        Self::parse_pairs(text, ';', '=')
    }

    /// Parse separator-delimited pairs into string values.
    ///
    /// Empty text yields an empty map. Each segment is split at the first
    /// `key_value_separator`; the value keeps any later separators.
    pub fn parse_pairs(text: &str, separator: char, key_value_separator: char) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::new());
        }

        let segments: Vec<&str> = text.split(separator).collect();
        let mut map = Self::with_capacity(segments.len());
        for segment in segments {
            let (key, value) = segment.split_once(key_value_separator).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "pair '{segment}' has no '{key_value_separator}' separator"
                ))
            })?;
            if map.contains_key(key) {
                return Err(Error::invalid_argument(format!("duplicate key '{key}'")));
            }
            map.entries.push((key.to_string(), Value::Str(value.to_string())));
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// JSON bridge
// ---------------------------------------------------------------------------

impl FieldMap {
    /// Build a map from a flat JSON object.
    ///
    /// Nested objects are rejected: a field map carries no object graphs.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::invalid_argument("JSON input is not an object"))?;
        let mut map = Self::with_capacity(object.len());
        for (key, value) in object {
            let value = value_from_json(value).map_err(|e| e.with_context(format!("key '{key}'")))?;
            map.entries.push((key.clone(), value));
        }
        Ok(map)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .iter()
            .map(|(k, v)| (k.to_string(), value_to_json(v)))
            .collect();
        serde_json::Value::Object(object)
    }
}

fn value_from_json(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(value_from_json).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(_) => {
            return Err(Error::conversion("nested objects are not supported"));
        }
    })
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::I32(v) => (*v).into(),
        Value::I64(v) => (*v).into(),
        Value::U64(v) => (*v).into(),
        // Non-finite floats have no JSON form and become null.
        Value::F32(v) => serde_json::Number::from_f64(f64::from(*v))
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::F64(v) => serde_json::Number::from_f64(*v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Char(_) | Value::Str(_) | Value::Date(_) | Value::DateTime(_) => {
            serde_json::Value::String(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_insert_replaces_in_place() {
        // Arrange
        let mut map = FieldMap::new();
        map.insert("a", 1);
        map.insert("b", 2);

        // Act
        let previous = map.insert("a", 3);

        // Assert
        assert_eq!(previous, Some(Value::I32(1)));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::I32(3)));
    }

    #[rstest]
    fn test_remove_and_get_or_null() {
        let mut map: FieldMap = [("a", 1), ("b", 2)].into_iter().collect();

        assert_eq!(map.remove("a"), Some(Value::I32(1)));
        assert_eq!(map.get_or_null("a"), Value::Null);
        assert_eq!(map.get_or_null("b"), Value::I32(2));
        assert_eq!(map.len(), 1);
    }

    #[rstest]
    fn test_iter_yields_entries_in_insertion_order() {
        // Arrange
        let mut map = FieldMap::new();
        map.insert("b", 2);
        map.insert("a", "x");
        map.insert("b", 3);

        // Act
        let entries: Vec<_> = map.iter().collect();

        // Assert
        assert_eq!(entries, vec![("b", &Value::I32(3)), ("a", &Value::from("x"))]);
    }

    #[rstest]
    fn test_parse_pairs_default() {
        // Act
        let map = FieldMap::parse_pairs_default("name=Ann;age=41;expr=a=b").unwrap();

        // Assert
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "age", "expr"]);
        assert_eq!(map.get("age"), Some(&Value::from("41")));
        assert_eq!(map.get("expr"), Some(&Value::from("a=b")));
    }

    #[rstest]
    fn test_parse_pairs_empty_text_is_empty_map() {
        let map = FieldMap::parse_pairs("", ',', ':').unwrap();

        assert!(map.is_empty());
        assert!(!map.is_valid());
    }

    #[rstest]
    #[case("a=1;b")]
    #[case("a=1;a=2")]
    fn test_parse_pairs_rejects_malformed(#[case] text: &str) {
        let err = FieldMap::parse_pairs_default(text).unwrap_err();

        assert!(err.is_invalid_argument(), "{err}");
    }

    #[rstest]
    fn test_from_json_keeps_order_and_types() {
        // Arrange
        let json = json!({"name": "Ann", "age": 41, "score": 1.5, "tags": ["x"], "nick": null});

        // Act
        let map = FieldMap::from_json(&json).unwrap();

        // Assert
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec!["name", "age", "score", "tags", "nick"]
        );
        assert_eq!(map.get("age"), Some(&Value::I64(41)));
        assert_eq!(map.get("score"), Some(&Value::F64(1.5)));
        assert_eq!(map.get("tags"), Some(&Value::List(vec![Value::from("x")])));
        assert_eq!(map.get("nick"), Some(&Value::Null));
        assert_eq!(map.to_json(), json);
    }

    #[rstest]
    fn test_from_json_rejects_nested_objects() {
        let err = FieldMap::from_json(&json!({"inner": {"a": 1}})).unwrap_err();

        assert_eq!(
            err,
            Error::Conversion("key 'inner': nested objects are not supported".to_string())
        );
    }

    #[rstest]
    fn test_from_json_rejects_non_object() {
        let err = FieldMap::from_json(&json!([1, 2])).unwrap_err();

        assert!(err.is_invalid_argument());
    }
}
