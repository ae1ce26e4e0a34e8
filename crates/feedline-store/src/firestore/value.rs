//! Transcoding between JSON values and the store's typed value encoding.
//!
//! On the wire every field value is wrapped in a single-member object naming
//! its type: `{"stringValue": "x"}`, `{"integerValue": "42"}` (integers
//! travel as decimal strings), `{"mapValue": {"fields": {...}}}`, and so on.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::store::Fields;

/// Encode a JSON object as a typed `fields` map.
pub fn encode_fields(fields: &Fields) -> Value {
    let mut out = Map::new();
    for (name, value) in fields {
        out.insert(name.clone(), encode_value(value));
    }
    Value::Object(out)
}

/// Encode one JSON value as a typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({"nullValue": null}),
        Value::Bool(b) => json!({"booleanValue": b}),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({"integerValue": i.to_string()}),
            None => json!({"doubleValue": n.as_f64()}),
        },
        Value::String(s) => json!({"stringValue": s}),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({"arrayValue": {"values": values}})
        }
        Value::Object(members) => {
            let mut fields = Map::new();
            for (name, member) in members {
                fields.insert(name.clone(), encode_value(member));
            }
            json!({"mapValue": {"fields": fields}})
        }
    }
}

/// Decode a typed `fields` map into a JSON object.
pub fn decode_fields(fields: &Value) -> StoreResult<Fields> {
    let mut out = Fields::new();
    let Some(members) = fields.as_object() else {
        return Ok(out);
    };
    for (name, value) in members {
        out.insert(name.clone(), decode_value(value)?);
    }
    Ok(out)
}

/// Decode one typed value.
pub fn decode_value(value: &Value) -> StoreResult<Value> {
    let wrapper = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("expected a typed value, got {value}")))?;
    let (kind, inner) = wrapper
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty typed value".to_string()))?;

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| StoreError::Decode("integer value is not a string".to_string()))?;
            let parsed: i64 = raw
                .parse()
                .map_err(|_| StoreError::Decode(format!("invalid integer value: {raw}")))?;
            Value::Number(parsed.into())
        }
        // Timestamps and references surface to callers as plain strings.
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "bytesValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| StoreError::Decode("bytes value is not a string".to_string()))?;
            BASE64
                .decode(raw)
                .map_err(|e| StoreError::Decode(format!("invalid base64 bytes value: {e}")))?;
            inner.clone()
        }
        "geoPointValue" => inner.clone(),
        "mapValue" => {
            let fields = inner.get("fields").cloned().unwrap_or(Value::Object(Map::new()));
            Value::Object(decode_fields(&fields)?)
        }
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            Value::Array(items.iter().map(decode_value).collect::<StoreResult<_>>()?)
        }
        other => {
            return Err(StoreError::Decode(format!(
                "unsupported value type: {other}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!(null)), json!({"nullValue": null}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(encode_value(&json!(2.5)), json!({"doubleValue": 2.5}));
        assert_eq!(encode_value(&json!("hi")), json!({"stringValue": "hi"}));
    }

    #[test]
    fn test_round_trip_nested_document() {
        let original = fields_of(json!({
            "title": "first post",
            "views": 7,
            "score": 4.5,
            "tags": ["a", "b"],
            "author": {"userId": "u1", "verified": false},
            "deletedAt": null
        }));

        let encoded = encode_fields(&original);
        let decoded = decode_fields(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_timestamp_as_string() {
        let decoded = decode_value(&json!({"timestampValue": "2026-01-02T03:04:05Z"})).unwrap();
        assert_eq!(decoded, json!("2026-01-02T03:04:05Z"));
    }

    #[test]
    fn test_decode_valid_bytes() {
        let decoded = decode_value(&json!({"bytesValue": "aGVsbG8="})).unwrap();
        assert_eq!(decoded, json!("aGVsbG8="));
    }

    #[test]
    fn test_decode_rejects_bad_bytes() {
        let result = decode_value(&json!({"bytesValue": "not base64!!"}));
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let result = decode_value(&json!({"mysteryValue": 1}));
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_bad_integer() {
        let result = decode_value(&json!({"integerValue": "forty-two"}));
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }
}
