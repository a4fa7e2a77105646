//! Bidirectional mapping between native values and portable JSON.
//!
//! Encoding turns a [`Value`] tree into plain JSON, wrapping the three
//! store-native types under their protocol keys (see [`crate::model`]).
//! Decoding inverts that, walking a parsed JSON tree top-down.
//!
//! With both conversion flags off the mapping is lossless:
//! `decode(&encode(v)?)? == v` for every encodable value. Each flag trades
//! that guarantee for plainer output (bare ISO-8601 strings, bare two-key
//! maps), and recovery on decode is pattern-based and therefore ambiguous.
//! That lossy behavior is part of the contract, not an accident.

pub mod iso8601;

use chrono::SecondsFormat;
use serde_json::{json, Map, Value as Json};

use crate::error::{Error, Result};
use crate::model::{
    Fields, GeoPoint, Record, Value, DATA_KEY, DOC_ID_KEY, DOC_REF_KEY, GEOPOINT_KEY,
    TIMESTAMP_KEY,
};

/// Lossy-conversion switches, off by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Encode timestamps as bare ISO-8601 strings; decode any string
    /// matching the strict grammar as a timestamp.
    pub timestamps_as_strings: bool,
    /// Encode geopoints as bare `{latitude, longitude}` maps; decode any
    /// exactly-two-key numeric map of that shape as a geopoint.
    pub geopoints_as_maps: bool,
}

/// Encode a native value into its portable JSON form.
pub fn encode(value: &Value, opts: &ConvertOptions) -> Result<Json> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Int(i) => Ok(json!(i)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| Error::UnsupportedType {
                detail: format!("non-finite float {f} has no JSON form"),
            }),
        Value::String(s) => Ok(Json::String(s.clone())),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(encode(item, opts)?);
            }
            Ok(Json::Array(out))
        }
        Value::Map(fields) => encode_fields(fields, opts),
        Value::Timestamp(ts) => {
            let iso = ts.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            if opts.timestamps_as_strings {
                Ok(Json::String(iso))
            } else {
                Ok(json!({ TIMESTAMP_KEY: iso }))
            }
        }
        Value::GeoPoint(gp) => {
            let map = json!({ "latitude": gp.latitude(), "longitude": gp.longitude() });
            if opts.geopoints_as_maps {
                Ok(map)
            } else {
                Ok(json!({ GEOPOINT_KEY: map }))
            }
        }
        Value::Reference(path) => Ok(json!({ DOC_REF_KEY: path })),
    }
}

/// Encode a field map into a JSON object.
pub fn encode_fields(fields: &Fields, opts: &ConvertOptions) -> Result<Json> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        out.insert(key.clone(), encode(value, opts)?);
    }
    Ok(Json::Object(out))
}

/// Decode portable JSON into a native value.
pub fn decode(raw: &Json, opts: &ConvertOptions) -> Result<Value> {
    match raw {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(Error::UnsupportedType {
                    detail: format!("number {n} is outside the representable range"),
                })
            }
        }
        Json::String(s) => {
            if opts.timestamps_as_strings {
                if let Some(ts) = iso8601::parse(s) {
                    return Ok(Value::Timestamp(ts));
                }
            }
            Ok(Value::String(s.clone()))
        }
        Json::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(decode(item, opts)?);
            }
            Ok(Value::Array(out))
        }
        Json::Object(obj) => decode_object(obj, opts),
    }
}

fn decode_object(obj: &Map<String, Json>, opts: &ConvertOptions) -> Result<Value> {
    if obj.len() == 1 {
        if let Some(raw) = obj.get(TIMESTAMP_KEY) {
            let text = raw.as_str().ok_or_else(|| Error::InvalidValue {
                detail: format!("{TIMESTAMP_KEY} payload must be a string"),
            })?;
            let ts = iso8601::parse(text).ok_or_else(|| Error::InvalidValue {
                detail: format!("{TIMESTAMP_KEY} payload '{text}' is not ISO-8601"),
            })?;
            return Ok(Value::Timestamp(ts));
        }
        if let Some(raw) = obj.get(GEOPOINT_KEY) {
            return decode_geopoint(raw).map(Value::GeoPoint);
        }
        if let Some(raw) = obj.get(DOC_REF_KEY) {
            let path = raw.as_str().ok_or_else(|| Error::InvalidValue {
                detail: format!("{DOC_REF_KEY} payload must be a string path"),
            })?;
            return Ok(Value::Reference(path.to_string()));
        }
    }

    if opts.geopoints_as_maps && obj.len() == 2 {
        if let (Some(lat), Some(lon)) = (
            obj.get("latitude").and_then(Json::as_f64),
            obj.get("longitude").and_then(Json::as_f64),
        ) {
            return GeoPoint::new(lat, lon).map(Value::GeoPoint);
        }
    }

    let mut fields = Fields::new();
    for (key, value) in obj {
        fields.insert(key.clone(), decode(value, opts)?);
    }
    Ok(Value::Map(fields))
}

fn decode_geopoint(raw: &Json) -> Result<GeoPoint> {
    let (Some(lat), Some(lon)) = (
        raw.get("latitude").and_then(Json::as_f64),
        raw.get("longitude").and_then(Json::as_f64),
    ) else {
        return Err(Error::InvalidValue {
            detail: format!("{GEOPOINT_KEY} payload must carry numeric latitude and longitude"),
        });
    };
    GeoPoint::new(lat, lon)
}

/// Decode one raw input object into a [`Record`].
///
/// An object carrying both `__doc_id__` (string) and `__data__` (object) is
/// the identity form; anything else is an anonymous payload. Field values
/// go through [`decode`] with the given options.
pub fn decode_record(raw: &Map<String, Json>, opts: &ConvertOptions) -> Result<Record> {
    if let (Some(id_raw), Some(data_raw)) = (raw.get(DOC_ID_KEY), raw.get(DATA_KEY)) {
        let doc_id = id_raw.as_str().ok_or_else(|| Error::InvalidValue {
            detail: format!("{DOC_ID_KEY} must be a string"),
        })?;
        let data = data_raw.as_object().ok_or_else(|| Error::InvalidValue {
            detail: format!("{DATA_KEY} must be an object"),
        })?;
        return Ok(Record::identified(doc_id, decode_payload(data, opts)?));
    }
    Ok(Record::anonymous(decode_payload(raw, opts)?))
}

fn decode_payload(obj: &Map<String, Json>, opts: &ConvertOptions) -> Result<Fields> {
    let mut fields = Fields::new();
    for (key, value) in obj {
        fields.insert(key.clone(), decode(value, opts)?);
    }
    Ok(fields)
}
