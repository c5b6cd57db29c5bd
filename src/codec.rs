//! Conversion between JSON value trees and DynamoDB attribute values.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Number, Value};

/// Converts JSON trees to and from the store's native attribute values.
///
/// Both directions are total. For JSON made of objects, arrays, strings,
/// numbers, booleans and nulls, `from_attribute(&to_attribute(v)) == v`.
pub trait AttributeCodec: Send + Sync {
    fn to_attribute(&self, value: &Value) -> AttributeValue;

    fn from_attribute(&self, attribute: &AttributeValue) -> Value;

    /// Converts a JSON object into an attribute map. Non-object values are
    /// stored under no key, so they produce an empty map.
    fn to_attribute_map(&self, value: &Value) -> HashMap<String, AttributeValue> {
        match self.to_attribute(value) {
            AttributeValue::M(map) => map,
            _ => HashMap::new(),
        }
    }

    fn from_attribute_map(&self, attributes: &HashMap<String, AttributeValue>) -> Value {
        Value::Object(
            attributes
                .iter()
                .map(|(k, v)| (k.clone(), self.from_attribute(v)))
                .collect(),
        )
    }
}

/// Structural JSON codec.
///
/// | JSON    | attribute      |
/// |---------|----------------|
/// | object  | `M`            |
/// | array   | `L`            |
/// | string  | `S`            |
/// | number  | `N`            |
/// | boolean | `BOOL`         |
/// | null    | `NULL(true)`   |
///
/// Attribute types with no JSON counterpart are still decoded: string,
/// number and binary sets become arrays, binary becomes an array of byte
/// values. An `N` that is neither an integer nor a finite float is kept as a
/// JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAttributeCodec;

impl AttributeCodec for JsonAttributeCodec {
    fn to_attribute(&self, value: &Value) -> AttributeValue {
        match value {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Array(values) => {
                AttributeValue::L(values.iter().map(|v| self.to_attribute(v)).collect())
            }
            Value::Object(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.to_attribute(v)))
                    .collect(),
            ),
        }
    }

    fn from_attribute(&self, attribute: &AttributeValue) -> Value {
        match attribute {
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::N(n) => parse_number(n),
            AttributeValue::S(s) => Value::String(s.clone()),
            AttributeValue::L(values) => {
                Value::Array(values.iter().map(|v| self.from_attribute(v)).collect())
            }
            AttributeValue::M(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.from_attribute(v)))
                    .collect::<Map<_, _>>(),
            ),
            AttributeValue::Ss(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            AttributeValue::Ns(values) => Value::Array(values.iter().map(|n| parse_number(n)).collect()),
            AttributeValue::B(blob) => bytes(blob.as_ref()),
            AttributeValue::Bs(blobs) => {
                Value::Array(blobs.iter().map(|blob| bytes(blob.as_ref())).collect())
            }
            _ => Value::Null,
        }
    }
}

fn parse_number(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

fn bytes(data: &[u8]) -> Value {
    Value::Array(data.iter().map(|b| Value::Number((*b).into())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::primitives::Blob;
    use proptest::prelude::*;
    use serde_json::json;

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<u64>().prop_map(Value::from),
            any::<f64>()
                .prop_filter("finite float only", |v| v.is_finite())
                .prop_map(Value::from),
            "\\PC{0,32}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("\\PC{0,16}", inner, 0..8)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_any_json_tree_round_trips(value in arb_json()) {
            let codec = JsonAttributeCodec;
            prop_assert_eq!(codec.from_attribute(&codec.to_attribute(&value)), value);
        }
    }

    #[test]
    fn test_round_trip_nested_document() {
        let codec = JsonAttributeCodec;
        let value = json!({
            "amenities": {
                "rooms": 100,
                "gym": 2,
                "swimmingPool": true,
                "rating": 4.5,
                "floors": [1, -2, {"name": "lobby", "open": null}],
            },
            "tags": [],
            "note": "",
            "big": 18446744073709551615u64,
        });

        assert_eq!(codec.from_attribute(&codec.to_attribute(&value)), value);
    }

    #[test]
    fn test_scalars_map_to_native_variants() {
        let codec = JsonAttributeCodec;
        assert_eq!(codec.to_attribute(&json!(null)), AttributeValue::Null(true));
        assert_eq!(codec.to_attribute(&json!(false)), AttributeValue::Bool(false));
        assert_eq!(codec.to_attribute(&json!(12)), AttributeValue::N("12".to_string()));
        assert_eq!(codec.to_attribute(&json!("x")), AttributeValue::S("x".to_string()));
        assert_eq!(
            codec.to_attribute(&json!([1])),
            AttributeValue::L(vec![AttributeValue::N("1".to_string())])
        );
    }

    #[test]
    fn test_attributes_without_json_counterpart() {
        let codec = JsonAttributeCodec;
        assert_eq!(
            codec.from_attribute(&AttributeValue::Ss(vec!["a".to_string(), "b".to_string()])),
            json!(["a", "b"])
        );
        assert_eq!(
            codec.from_attribute(&AttributeValue::Ns(vec!["1".to_string(), "2.5".to_string()])),
            json!([1, 2.5])
        );
        assert_eq!(
            codec.from_attribute(&AttributeValue::B(Blob::new(vec![0u8, 255]))),
            json!([0, 255])
        );
        assert_eq!(
            codec.from_attribute(&AttributeValue::N("1e400".to_string())),
            json!("1e400")
        );
    }

    #[test]
    fn test_attribute_map_of_non_object_is_empty() {
        let codec = JsonAttributeCodec;
        assert!(codec.to_attribute_map(&json!([1, 2])).is_empty());

        let map = codec.to_attribute_map(&json!({"id": "1"}));
        assert_eq!(codec.from_attribute_map(&map), json!({"id": "1"}));
    }
}
