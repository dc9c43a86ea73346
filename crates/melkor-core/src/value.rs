use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One crawled entity: field name to value.
///
/// A `BTreeMap` keeps field order stable, so two crawls of identical
/// provider data serialize identically.
pub type Record = BTreeMap<String, Value>;

/// A heterogeneous field value as returned by a provider.
///
/// Serialized untagged, so the JSON form of a `Value` is the plain JSON
/// value it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(Record),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Map(record)
    }
}

/// Absent provider fields become `Null` rather than failing the conversion.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Convert a JSON object into a [`Record`]. Non-object input yields `None`.
pub fn record_from_json(json: serde_json::Value) -> Option<Record> {
    match Value::from(json) {
        Value::Map(record) => Some(record),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip_preserves_shape() {
        let input = json!({
            "InstanceId": "i-0",
            "EbsOptimized": false,
            "AmiLaunchIndex": 0,
            "KernelId": null,
            "Tags": [{"Key": "Team", "Value": "team0"}],
            "State": {"Code": 16, "Name": "running"}
        });

        let value = Value::from(input.clone());
        let output = serde_json::to_value(&value).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn test_deserialize_picks_matching_variant() {
        let value: Value = serde_json::from_str(r#"[null, true, 3, "x", {"a": []}]"#).unwrap();
        let items = value.as_list().unwrap();
        assert!(items[0].is_null());
        assert_eq!(items[1], Value::Bool(true));
        assert_eq!(items[2], Value::from(3i64));
        assert_eq!(items[3].as_str(), Some("x"));
        assert_eq!(
            items[4].as_map().unwrap().get("a"),
            Some(&Value::List(vec![]))
        );
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("eu-west-1b")).as_str(), Some("eu-west-1b"));
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    #[test]
    fn test_record_from_json_rejects_non_objects() {
        assert!(record_from_json(json!(["a"])).is_none());
        let record = record_from_json(json!({"a": "b"})).unwrap();
        assert_eq!(record.get("a").and_then(Value::as_str), Some("b"));
    }
}
