use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ErrorKind, NutriResult};
use crate::nutri_error;

/// Output of an analytical operation.
///
/// Entries are kept in a [`Vec`] because their order is part of the result: it is preserved
/// when the result is serialized, persisted and returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A flat `key -> mean` mapping.
    Means(Vec<(String, f64)>),
    /// A single `key -> {key -> mean}` mapping.
    Nested {
        key: String,
        entries: Vec<(String, f64)>,
    },
}

impl QueryResult {
    /// Returns the top level entries of a flat result, [`None`] for nested ones.
    pub fn means(&self) -> Option<&[(String, f64)]> {
        match self {
            QueryResult::Means(entries) => Some(entries),
            QueryResult::Nested { .. } => None,
        }
    }

    /// Converts the result into an order preserving JSON value.
    pub fn to_json(&self) -> NutriResult<serde_json::Value> {
        to_json_value(self)
    }
}

struct OrderedMeans<'a>(&'a [(String, f64)]);

impl Serialize for OrderedMeans<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryResult::Means(entries) => OrderedMeans(entries).serialize(serializer),
            QueryResult::Nested { key, entries } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(key, &OrderedMeans(entries))?;
                map.end()
            }
        }
    }
}

/// Serializes `value` into a JSON value, reporting failures as serialization errors.
fn to_json_value<T: Serialize>(value: &T) -> NutriResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|err| {
        nutri_error!(
            ErrorKind::SerializationError,
            "Query result serialization failed",
            &err,
            source: err
        )
    })
}

/// Renders the `('category', 'stratification')` key used by per-state category breakdowns.
pub fn state_category_key(category: &str, stratification: &str) -> String {
    format!("('{category}', '{stratification}')")
}

/// Renders the `('location', 'category', 'stratification')` key used by category breakdowns.
pub fn category_key(location: &str, category: &str, stratification: &str) -> String {
    format!("('{location}', '{category}', '{stratification}')")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_keeps_entry_order() {
        let result = QueryResult::Means(vec![
            ("Utah".to_owned(), 1.5),
            ("Alabama".to_owned(), 2.0),
        ]);

        let json = serde_json::to_string(&result).unwrap();

        assert_eq!(json, r#"{"Utah":1.5,"Alabama":2.0}"#);
        assert_eq!(result.to_json().unwrap().to_string(), json);
    }

    #[test]
    fn test_nested_result_serialization() {
        let result = QueryResult::Nested {
            key: "Utah".to_owned(),
            entries: vec![(state_category_key("Sex", "Male"), 30.0)],
        };

        let json = serde_json::to_string(&result).unwrap();

        assert_eq!(json, r#"{"Utah":{"('Sex', 'Male')":30.0}}"#);
        assert!(result.means().is_none());
    }

    #[test]
    fn test_serialization_failure_is_serialization_error() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("value cannot be represented"))
            }
        }

        let err = to_json_value(&Unserializable).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SerializationError);
        assert!(err.summary().contains("value cannot be represented"));
    }

    #[test]
    fn test_category_key_format() {
        assert_eq!(
            category_key("Ohio", "Age (years)", "18 - 24"),
            "('Ohio', 'Age (years)', '18 - 24')"
        );
    }
}
