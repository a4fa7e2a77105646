//! The native value union.
//!
//! Every field of a stored document is one of these variants. The three
//! store-native types (`Timestamp`, `GeoPoint`, `Reference`) are the reason
//! the codec exists: plain JSON has no way to carry them without a wrapper
//! convention.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Field map of a document payload.
pub type Fields = BTreeMap<String, Value>;

/// A typed unit of data within a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(Fields),
    /// UTC instant with sub-second precision.
    Timestamp(DateTime<Utc>),
    GeoPoint(GeoPoint),
    /// Store-relative document path, e.g. `users/u1`.
    Reference(String),
}

impl Value {
    /// Variant name for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Timestamp(_) => "timestamp",
            Self::GeoPoint(_) => "geopoint",
            Self::Reference(_) => "reference",
        }
    }
}

/// Order two values of comparable kinds.
///
/// Integers and floats compare across the numeric kinds; everything else
/// only compares within its own kind. `None` means the pair is unordered,
/// which query evaluation treats as "condition not satisfied".
#[must_use]
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Reference(x), Value::Reference(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// A geographic point: latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a geopoint, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidValue {
                detail: format!("latitude {latitude} out of range [-90, 90]"),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidValue {
                detail: format!("longitude {longitude} out of range [-180, 180]"),
            });
        }
        Ok(Self { latitude, longitude })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}
