//! Bulk document writes.

use tracing::debug;

use crate::codec::{self, ConvertOptions};
use crate::error::Result;
use crate::format::RawRecord;
use crate::path::StorePath;
use crate::pipeline::Batcher;
use crate::store::{DocumentStore, WriteOp};
use crate::validate::RecordValidator;

/// Options for [`write_records`].
#[derive(Default)]
pub struct WriteOptions<'a> {
    /// Field the store fills with its commit time on every written doc.
    pub stamp_field: Option<String>,
    pub convert: ConvertOptions,
    pub dry_run: bool,
    /// Optional per-record validation hook, run on the raw serialized
    /// record before any transformation.
    pub validator: Option<&'a dyn RecordValidator>,
}

/// Outcome of a write or dry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Records processed (and, outside dry runs, committed).
    pub records: usize,
    /// Batch commits issued against the store; 0 in a dry run.
    pub commits: usize,
}

/// Write every input record into `collection`.
///
/// Records in identity form keep their `__doc_id__`; anonymous records get
/// a store-assigned id. Commits happen every 500 records, with the
/// trailing partial batch committed at the end.
pub fn write_records(
    store: &dyn DocumentStore,
    collection: &StorePath,
    records: &[RawRecord],
    opts: &WriteOptions<'_>,
) -> Result<WriteReport> {
    let mut batcher = Batcher::new(store, opts.dry_run);

    for raw in records {
        if let Some(validator) = opts.validator {
            validator.validate(serde_json::to_string(raw)?.as_bytes())?;
        }

        let record = codec::decode_record(raw, &opts.convert)?;
        let id = match record.doc_id {
            Some(id) => id,
            None => store.generate_id(),
        };
        debug!(%collection, id, "queueing write");
        batcher.push(WriteOp::Set {
            doc: collection.child(&id),
            fields: record.fields,
            merge: false,
            stamp_field: opts.stamp_field.clone(),
        })?;
    }
    batcher.flush()?;

    Ok(WriteReport {
        records: batcher.records(),
        commits: batcher.commits(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Value, DATA_KEY, DOC_ID_KEY};
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n).map(|i| raw(json!({ "n": i }))).collect()
    }

    #[test]
    fn test_batch_cadence_1001_records_3_commits() {
        let store = MemoryStore::new();
        let collection = StorePath::parse_collection("items").unwrap();
        let report =
            write_records(&store, &collection, &records(1001), &WriteOptions::default())
                .unwrap();

        assert_eq!(report.records, 1001);
        assert_eq!(report.commits, 3);
        assert_eq!(store.commit_count(), 3);
        assert_eq!(store.len(), 1001);
    }

    #[test]
    fn test_dry_run_counts_without_commits() {
        let store = MemoryStore::new();
        let collection = StorePath::parse_collection("items").unwrap();
        let opts = WriteOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = write_records(&store, &collection, &records(1001), &opts).unwrap();

        assert_eq!(report.records, 1001);
        assert_eq!(report.commits, 0);
        assert_eq!(store.commit_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_explicit_id_is_used() {
        let store = MemoryStore::new();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![raw(json!({
            DOC_ID_KEY: "u1",
            DATA_KEY: { "name": "Ada" }
        }))];
        write_records(&store, &collection, &input, &WriteOptions::default()).unwrap();

        let fields = store.get("users/u1").unwrap();
        assert_eq!(fields.get("name"), Some(&Value::String("Ada".into())));
    }

    #[test]
    fn test_anonymous_record_gets_generated_id() {
        let store = MemoryStore::new();
        let collection = StorePath::parse_collection("users").unwrap();
        write_records(
            &store,
            &collection,
            &[raw(json!({ "name": "Ada" }))],
            &WriteOptions::default(),
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("users/u1").is_none());
    }

    #[test]
    fn test_stamp_field_applied() {
        let store = MemoryStore::new();
        let collection = StorePath::parse_collection("users").unwrap();
        let opts = WriteOptions {
            stamp_field: Some("imported_at".into()),
            ..Default::default()
        };
        write_records(
            &store,
            &collection,
            &[raw(json!({ DOC_ID_KEY: "u1", DATA_KEY: {} }))],
            &opts,
        )
        .unwrap();
        let fields = store.get("users/u1").unwrap();
        assert!(matches!(
            fields.get("imported_at"),
            Some(Value::Timestamp(_))
        ));
    }

    #[test]
    fn test_failing_validator_aborts_before_commit() {
        struct RejectAll;
        impl RecordValidator for RejectAll {
            fn validate(&self, _raw: &[u8]) -> Result<()> {
                Err(crate::error::Error::ValidationFailed {
                    detail: "nope".into(),
                })
            }
        }

        let store = MemoryStore::new();
        let collection = StorePath::parse_collection("users").unwrap();
        let opts = WriteOptions {
            validator: Some(&RejectAll),
            ..Default::default()
        };
        let err =
            write_records(&store, &collection, &records(3), &opts).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::ValidationFailed { .. }
        ));
        assert_eq!(store.commit_count(), 0);
    }
}
