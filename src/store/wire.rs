//! Firestore REST wire form of native values.
//!
//! The REST API types every field as a one-key object (`integerValue`,
//! `mapValue`, …). Integers travel as decimal strings; references travel as
//! full resource names (`projects/…/documents/users/u1`), which this module
//! prefixes on the way out and strips on the way in.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value as Json};

use crate::model::{Fields, GeoPoint, Value};
use crate::store::StoreError;

/// Encode one value into its REST wire form.
#[must_use]
pub fn to_wire(value: &Value, name_prefix: &str) -> Json {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Int(i) => json!({ "integerValue": i.to_string() }),
        Value::Float(f) => json!({ "doubleValue": f }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Timestamp(ts) => json!({
            "timestampValue": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        }),
        Value::GeoPoint(gp) => json!({
            "geoPointValue": { "latitude": gp.latitude(), "longitude": gp.longitude() }
        }),
        Value::Reference(path) => json!({ "referenceValue": format!("{name_prefix}/{path}") }),
        Value::Array(items) => {
            let values: Vec<Json> = items.iter().map(|v| to_wire(v, name_prefix)).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Map(fields) => json!({ "mapValue": { "fields": fields_to_wire(fields, name_prefix) } }),
    }
}

/// Encode a field map into the REST `fields` object.
#[must_use]
pub fn fields_to_wire(fields: &Fields, name_prefix: &str) -> Json {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        out.insert(key.clone(), to_wire(value, name_prefix));
    }
    Json::Object(out)
}

/// Decode one REST wire value.
pub fn from_wire(raw: &Json, name_prefix: &str) -> Result<Value, StoreError> {
    let obj = raw.as_object().ok_or_else(|| invalid("value is not an object"))?;
    let (kind, payload) = obj
        .iter()
        .next()
        .ok_or_else(|| invalid("value object is empty"))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => payload
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| invalid("booleanValue is not a boolean")),
        "integerValue" => payload
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::Int)
            .ok_or_else(|| invalid("integerValue is not a decimal string")),
        "doubleValue" => payload
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| invalid("doubleValue is not a number")),
        "stringValue" => payload
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| invalid("stringValue is not a string")),
        "timestampValue" => {
            let text = payload
                .as_str()
                .ok_or_else(|| invalid("timestampValue is not a string"))?;
            DateTime::parse_from_rfc3339(text)
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|e| invalid(&format!("timestampValue '{text}': {e}")))
        }
        "geoPointValue" => {
            let lat = payload.get("latitude").and_then(Json::as_f64).unwrap_or(0.0);
            let lon = payload
                .get("longitude")
                .and_then(Json::as_f64)
                .unwrap_or(0.0);
            GeoPoint::new(lat, lon)
                .map(Value::GeoPoint)
                .map_err(|e| invalid(&e.to_string()))
        }
        "referenceValue" => {
            let name = payload
                .as_str()
                .ok_or_else(|| invalid("referenceValue is not a string"))?;
            let path = name
                .strip_prefix(name_prefix)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(name);
            Ok(Value::Reference(path.to_string()))
        }
        "arrayValue" => {
            let items = payload
                .get("values")
                .and_then(Json::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_wire(item, name_prefix)?);
            }
            Ok(Value::Array(out))
        }
        "mapValue" => {
            let fields = payload.get("fields").and_then(Json::as_object);
            let mut out = Fields::new();
            if let Some(fields) = fields {
                for (key, value) in fields {
                    out.insert(key.clone(), from_wire(value, name_prefix)?);
                }
            }
            Ok(Value::Map(out))
        }
        other => Err(invalid(&format!("unsupported value kind '{other}'"))),
    }
}

/// Decode a REST `fields` object into a field map.
pub fn fields_from_wire(
    raw: Option<&Json>,
    name_prefix: &str,
) -> Result<Fields, StoreError> {
    let mut out = Fields::new();
    let Some(raw) = raw else {
        return Ok(out);
    };
    let obj = raw
        .as_object()
        .ok_or_else(|| invalid("document fields is not an object"))?;
    for (key, value) in obj {
        out.insert(key.clone(), from_wire(value, name_prefix)?);
    }
    Ok(out)
}

fn invalid(message: &str) -> StoreError {
    StoreError::InvalidResponse {
        message: message.to_string(),
    }
}
