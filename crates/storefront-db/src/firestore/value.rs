//! Conversion between plain JSON and Firestore's typed-value encoding.
//!
//! Firestore wraps every field in a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). Records are
//! serialized with serde to plain JSON first and converted here, so the
//! domain types never see the wire shape.

use serde_json::{json, Map, Value};

/// Encodes a plain JSON value as a Firestore `Value`.
#[must_use]
pub fn to_firestore(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // integerValue travels as a decimal string.
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encodes every entry of a JSON object as a Firestore field map.
#[must_use]
pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore(v)))
        .collect()
}

/// Decodes a Firestore `Value` into plain JSON.
///
/// Timestamps become RFC 3339 strings, which chrono deserializes directly.
/// Unknown wrappers decode as `null`.
#[must_use]
pub fn from_firestore(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map_or(Value::Null, Value::from),
            Value::Number(_) => inner.clone(),
            _ => Value::Null,
        },
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(from_firestore).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

/// Decodes a Firestore field map into a plain JSON object.
#[must_use]
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), from_firestore(v)))
        .collect()
}

/// Decodes a Firestore `Document` into a plain JSON object.
///
/// When the fields carry no `id`, the last segment of the document name is
/// used instead.
#[must_use]
pub fn decode_document(document: &Value) -> Value {
    let mut object = document
        .get("fields")
        .and_then(Value::as_object)
        .map(decode_fields)
        .unwrap_or_default();

    if !object.contains_key("id") {
        if let Some(doc_id) = document
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
        {
            object.insert("id".to_string(), Value::String(doc_id.to_string()));
        }
    }

    Value::Object(object)
}
