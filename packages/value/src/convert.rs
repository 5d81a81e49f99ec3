//! Conversions between Value, JSON and typed serde data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Value};

/// Decode a Value into a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value_to_json(value)).map_err(|e| Error::decode(e.to_string()))
}

/// Encode a Rust type as a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::encode(e.to_string()))?;
    Ok(json_to_value(json))
}

/// Convert a Value to `serde_json::Value`.
///
/// Non-finite floats become `null`.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert `serde_json::Value` to a Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        json_to_value(json)
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        value_to_json(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        value_to_json(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(json_to_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: i64,
        label: String,
    }

    #[test]
    fn typed_roundtrip() {
        let original = Counter {
            count: 3,
            label: "clicks".to_string(),
        };

        let value = to_value(&original).unwrap();
        assert_eq!(value.field("count"), Some(&Value::Integer(3)));

        let recovered: Counter = from_value(value).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn decode_mismatch_is_error() {
        let err = from_value::<Counter>(Value::from("nope")).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn json_numbers() {
        let value = json_to_value(json!({"integer": 42, "float": 2.75}));
        assert_eq!(value.field("integer"), Some(&Value::Integer(42)));
        assert_eq!(value.field("float"), Some(&Value::Float(2.75)));
    }

    #[test]
    fn nan_becomes_null() {
        assert_eq!(value_to_json(Value::Float(f64::NAN)), serde_json::Value::Null);
    }

    #[test]
    fn serde_text_roundtrip() {
        let value = Value::from(json!({"count": 1, "tags": ["a", "b"]}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"count":1,"tags":["a","b"]}"#);

        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
