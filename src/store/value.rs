//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type, e.g.
//! `{"stringValue": "x"}` or `{"mapValue": {"fields": {...}}}`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::error::TransportError;
use crate::models::TIMESTAMP_FIELDS;
use crate::store::types::Fields;

pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore carries 64-bit integers as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_field(key, value)))
            .collect(),
    )
}

/// Timestamp fields carry RFC 3339 strings in memory and `timestampValue` on the wire
fn encode_field(key: &str, value: &Value) -> Value {
    if TIMESTAMP_FIELDS.contains(&key) {
        if let Some(at) = value
            .as_str()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        {
            let at = at
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true);
            return json!({ "timestampValue": at });
        }
    }
    encode(value)
}

pub fn decode(value: &Value) -> Result<Value, TransportError> {
    let object = value
        .as_object()
        .ok_or_else(|| TransportError::Decode(format!("not a typed value: {value}")))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| TransportError::Decode("empty typed value".to_string()))?;

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => {
            let raw = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            let i = raw.ok_or_else(|| TransportError::Decode(format!("bad integer {inner}")))?;
            Value::from(i)
        }
        "doubleValue" => match inner {
            // NaN and infinities arrive as strings
            Value::String(_) => Value::Null,
            other => other.clone(),
        },
        "timestampValue" | "stringValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": inner.get("longitude").cloned().unwrap_or(json!(0.0)),
        }),
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode).collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Value::Array(values)
        }
        "mapValue" => match inner.get("fields") {
            Some(fields) => Value::Object(decode_fields(fields)?),
            None => Value::Object(Map::new()),
        },
        other => return Err(TransportError::Decode(format!("unknown value type {other}"))),
    };

    Ok(decoded)
}

pub fn decode_fields(fields: &Value) -> Result<Fields, TransportError> {
    let Some(fields) = fields.as_object() else {
        return Err(TransportError::Decode("document fields must be a map".to_string()));
    };

    fields
        .iter()
        .map(|(key, value)| decode(value).map(|decoded| (key.clone(), decoded)))
        .collect()
}
