//! Data types for documents and their portable JSON form.
//!
//! The wrapper keys below are a fixed wire-protocol convention shared by
//! every export and import this tool produces or consumes:
//!
//! - `__doc_id__` / `__data__`: the identity form of a record. An exported
//!   document is `{"__doc_id__": "<id>", "__data__": {…fields…}}`; a record
//!   written without the pair gets a store-assigned id.
//! - `__timestamp__`: wraps an ISO-8601 instant so it can be restored as a
//!   native timestamp on import.
//! - `__geopoint__`: wraps a `{"latitude": …, "longitude": …}` map.
//! - `__doc_ref__`: wraps an absolute document path.

mod value;

pub use value::{compare, Fields, GeoPoint, Value};

/// Identity key of an exported record.
pub const DOC_ID_KEY: &str = "__doc_id__";
/// Payload key of an exported record in identity form.
pub const DATA_KEY: &str = "__data__";
/// Wrapper key for native timestamps.
pub const TIMESTAMP_KEY: &str = "__timestamp__";
/// Wrapper key for native geopoints.
pub const GEOPOINT_KEY: &str = "__geopoint__";
/// Wrapper key for document references.
pub const DOC_REF_KEY: &str = "__doc_ref__";

/// One logical document: a field map plus an optional identity.
///
/// `doc_id` is `None` for records that should get a store-assigned id on
/// write. The payload under `__data__` is itself a plain field map; the
/// identity wrapper never nests.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub doc_id: Option<String>,
    pub fields: Fields,
}

impl Record {
    /// A record with no explicit identity.
    #[must_use]
    pub const fn anonymous(fields: Fields) -> Self {
        Self { doc_id: None, fields }
    }

    /// A record carrying an explicit document id.
    #[must_use]
    pub fn identified(doc_id: impl Into<String>, fields: Fields) -> Self {
        Self {
            doc_id: Some(doc_id.into()),
            fields,
        }
    }
}
