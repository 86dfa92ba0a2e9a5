//! Conversion between plain JSON values and Firestore typed values.
//!
//! Firestore wraps every value in a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "5"}`). Integers travel as
//! decimal strings.

use serde_json::{json, Map, Value as JsonValue};

use stockroom_core::Revision;

use crate::store::{Document, Fields, StoreError};

pub fn encode_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "nullValue": null }),
        JsonValue::Bool(b) => json!({ "booleanValue": b }),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        JsonValue::String(s) => json!({ "stringValue": s }),
        JsonValue::Array(items) => {
            let values: Vec<JsonValue> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        JsonValue::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> JsonValue {
    JsonValue::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

pub fn decode_value(value: &JsonValue) -> Result<JsonValue, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Codec(format!("typed value must be an object: {value}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Codec("empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(JsonValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(JsonValue::Bool)
            .ok_or_else(|| StoreError::Codec(format!("bad booleanValue: {inner}"))),
        "integerValue" => {
            let parsed = match inner {
                JsonValue::String(s) => s.parse::<i64>().ok(),
                JsonValue::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(JsonValue::from)
                .ok_or_else(|| StoreError::Codec(format!("bad integerValue: {inner}")))
        }
        "doubleValue" => inner
            .as_f64()
            .map(JsonValue::from)
            .ok_or_else(|| StoreError::Codec(format!("bad doubleValue: {inner}"))),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| JsonValue::String(s.to_string()))
            .ok_or_else(|| StoreError::Codec(format!("bad {kind}: {inner}"))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(JsonValue::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Ok(JsonValue::Array(values))
        }
        "mapValue" => match inner.get("fields") {
            Some(fields) => decode_fields(fields).map(JsonValue::Object),
            None => Ok(JsonValue::Object(Map::new())),
        },
        other => Err(StoreError::Codec(format!("unsupported value type: {other}"))),
    }
}

pub fn decode_fields(fields: &JsonValue) -> Result<Fields, StoreError> {
    let obj = fields
        .as_object()
        .ok_or_else(|| StoreError::Codec(format!("fields must be an object: {fields}")))?;
    obj.iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Decode a REST `Document` resource.
///
/// The key is the last segment of the resource name; the revision is the
/// document's `updateTime`.
pub fn decode_document(doc: &JsonValue) -> Result<Document, StoreError> {
    let name = doc
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| StoreError::Codec("document without name".to_string()))?;
    let key = name.rsplit('/').next().unwrap_or(name).to_string();

    let fields = match doc.get("fields") {
        Some(fields) => decode_fields(fields)?,
        None => Fields::new(),
    };

    let revision = doc
        .get("updateTime")
        .and_then(JsonValue::as_str)
        .map(Revision::new)
        .ok_or_else(|| StoreError::Codec(format!("document {key} without updateTime")))?;

    Ok(Document {
        key,
        fields,
        revision,
    })
}

/// Quote a field path segment when it is not a simple identifier.
pub fn field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}
