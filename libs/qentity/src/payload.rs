//! JSON ⇄ Qdrant payload value conversion.
//!
//! Qdrant's gRPC payload is a protobuf `Value` tree. Entities serialize to
//! `serde_json` first, so these helpers translate between the two trees,
//! keeping nested objects and arrays intact.

use std::collections::HashMap;

use qdrant_client::qdrant::{self, value::Kind, ListValue, NullValue, Struct, Value as QdrantValue};
use serde_json::{Map, Number, Value};

pub fn json_to_qdrant_value(value: Value) -> QdrantValue {
    let kind = match value {
        Value::Null => Kind::NullValue(NullValue::NullValue as i32),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Kind::StringValue(s),
        Value::Array(values) => Kind::ListValue(ListValue {
            values: values.into_iter().map(json_to_qdrant_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(Struct {
            fields: json_payload_to_qdrant(map),
        }),
    };

    QdrantValue { kind: Some(kind) }
}

pub fn qdrant_value_to_json(value: QdrantValue) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        // NaN and infinities have no JSON form
        Some(Kind::DoubleValue(f)) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(object)) => Value::Object(qdrant_payload_to_json(object.fields)),
    }
}

pub fn json_payload_to_qdrant(payload: Map<String, Value>) -> HashMap<String, qdrant::Value> {
    payload
        .into_iter()
        .map(|(key, value)| (key, json_to_qdrant_value(value)))
        .collect()
}

pub fn qdrant_payload_to_json(payload: HashMap<String, qdrant::Value>) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(key, value)| (key, qdrant_value_to_json(value)))
        .collect()
}

/// Human readable JSON type name, used in format errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(
            json_to_qdrant_value(json!(true)).kind,
            Some(Kind::BoolValue(true))
        );
        assert_eq!(json_to_qdrant_value(json!(42)).kind, Some(Kind::IntegerValue(42)));
        assert_eq!(json_to_qdrant_value(json!(1.5)).kind, Some(Kind::DoubleValue(1.5)));
        assert_eq!(
            json_to_qdrant_value(json!("text")).kind,
            Some(Kind::StringValue("text".to_string()))
        );
        assert!(matches!(
            json_to_qdrant_value(Value::Null).kind,
            Some(Kind::NullValue(_))
        ));
    }

    #[test]
    fn test_u64_beyond_i64_becomes_double() {
        let value = json_to_qdrant_value(json!(u64::MAX));
        assert!(matches!(value.kind, Some(Kind::DoubleValue(_))));
    }

    #[test]
    fn test_nested_payload_survives_both_directions() {
        let payload = json!({
            "title": "Rust",
            "tags": ["systems", "safety"],
            "meta": { "views": 10, "score": 0.25, "draft": false, "editor": null }
        });
        let Value::Object(map) = payload.clone() else {
            unreachable!()
        };

        let qdrant_payload = json_payload_to_qdrant(map);
        assert!(matches!(
            qdrant_payload["meta"].kind,
            Some(Kind::StructValue(_))
        ));
        assert!(matches!(qdrant_payload["tags"].kind, Some(Kind::ListValue(_))));

        let back = Value::Object(qdrant_payload_to_json(qdrant_payload));
        assert_eq!(back, payload);
    }

    #[test]
    fn test_missing_kind_and_nan_become_null() {
        assert_eq!(qdrant_value_to_json(QdrantValue { kind: None }), Value::Null);
        assert_eq!(
            qdrant_value_to_json(QdrantValue {
                kind: Some(Kind::DoubleValue(f64::NAN))
            }),
            Value::Null
        );
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!({})), "object");
        assert_eq!(json_type_name(&Value::Null), "null");
    }
}
