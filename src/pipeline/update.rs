//! Bulk document updates.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::codec::{self, ConvertOptions};
use crate::error::{Error, Result};
use crate::format::RawRecord;
use crate::model::DOC_ID_KEY;
use crate::path::StorePath;
use crate::pipeline::Batcher;
use crate::store::{DocumentStore, WriteOp};
use crate::validate::RecordValidator;

/// Options for [`update_records`].
#[derive(Default)]
pub struct UpdateOptions<'a> {
    /// Merge-upsert instead of strict update: create missing documents
    /// rather than failing with `NotFound`.
    pub upsert: bool,
    pub stamp_field: Option<String>,
    pub convert: ConvertOptions,
    pub dry_run: bool,
    pub validator: Option<&'a dyn RecordValidator>,
}

/// Outcome of an update or dry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Records queued for update (and, outside dry runs, committed).
    pub records: usize,
    /// Records skipped for lacking `__doc_id__`/`__data__`.
    pub skipped: usize,
    /// Batch commits issued against the store; 0 in a dry run.
    pub commits: usize,
}

/// Apply every identity-form input record to `collection`.
///
/// A pre-pass over the whole input rejects duplicate document ids before
/// any commit. Records missing the identity pair are skipped, not errors.
/// In strict mode a missing target document fails the run, but batches
/// committed before the failure remain committed.
pub fn update_records(
    store: &dyn DocumentStore,
    collection: &StorePath,
    records: &[RawRecord],
    opts: &UpdateOptions<'_>,
) -> Result<UpdateReport> {
    // duplicate ids would make later writes in the same run clobber
    // earlier ones; reject the whole operation up front
    let mut seen: HashSet<&str> = HashSet::new();
    for raw in records {
        if let Some(id) = raw.get(DOC_ID_KEY).and_then(serde_json::Value::as_str) {
            if !seen.insert(id) {
                return Err(Error::DuplicateKey { id: id.to_string() });
            }
        }
    }

    let mut batcher = Batcher::new(store, opts.dry_run);
    let mut skipped = 0usize;

    for raw in records {
        if let Some(validator) = opts.validator {
            validator.validate(serde_json::to_string(raw)?.as_bytes())?;
        }

        let record = codec::decode_record(raw, &opts.convert)?;
        let Some(id) = record.doc_id else {
            warn!("skipping record without __doc_id__/__data__");
            skipped += 1;
            continue;
        };

        let doc = collection.child(&id);
        debug!(%doc, upsert = opts.upsert, "queueing update");
        let op = if opts.upsert {
            WriteOp::Set {
                doc,
                fields: record.fields,
                merge: true,
                stamp_field: opts.stamp_field.clone(),
            }
        } else {
            WriteOp::Update {
                doc,
                fields: record.fields,
                stamp_field: opts.stamp_field.clone(),
            }
        };
        batcher.push(op)?;
    }
    batcher.flush()?;

    Ok(UpdateReport {
        records: batcher.records(),
        skipped,
        commits: batcher.commits(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fields, Value};
    use crate::store::memory::MemoryStore;
    use crate::store::StoreError;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let mut fields = Fields::new();
        fields.insert("age".into(), Value::Int(30));
        fields.insert("name".into(), Value::String("Ada".into()));
        store.insert("users/u1", fields);
        store
    }

    #[test]
    fn test_strict_update_merges_fields() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![raw(json!({
            DOC_ID_KEY: "u1",
            "__data__": { "age": 31 }
        }))];
        let report =
            update_records(&store, &collection, &input, &UpdateOptions::default()).unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(report.skipped, 0);
        let fields = store.get("users/u1").unwrap();
        assert_eq!(fields.get("age"), Some(&Value::Int(31)));
        assert_eq!(fields.get("name"), Some(&Value::String("Ada".into())));
    }

    #[test]
    fn test_duplicate_ids_fail_before_any_commit() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![
            raw(json!({ DOC_ID_KEY: "x", "__data__": { "a": 1 } })),
            raw(json!({ DOC_ID_KEY: "y", "__data__": { "a": 2 } })),
            raw(json!({ DOC_ID_KEY: "x", "__data__": { "a": 3 } })),
        ];
        let err = update_records(&store, &collection, &input, &UpdateOptions::default())
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateKey { ref id } if id == "x"));
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_incomplete_records_are_skipped() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![
            raw(json!({ DOC_ID_KEY: "u1", "__data__": { "age": 32 } })),
            // no __data__
            raw(json!({ DOC_ID_KEY: "u2" })),
            // no __doc_id__
            raw(json!({ "age": 9 })),
        ];
        let report =
            update_records(&store, &collection, &input, &UpdateOptions::default()).unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_strict_update_missing_doc_is_not_found() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![raw(json!({
            DOC_ID_KEY: "ghost",
            "__data__": { "age": 1 }
        }))];
        let err = update_records(&store, &collection, &input, &UpdateOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_upsert_creates_missing_doc() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![raw(json!({
            DOC_ID_KEY: "ghost",
            "__data__": { "age": 1 }
        }))];
        let opts = UpdateOptions {
            upsert: true,
            ..Default::default()
        };
        update_records(&store, &collection, &input, &opts).unwrap();
        assert!(store.get("users/ghost").is_some());
    }

    #[test]
    fn test_dry_run_issues_no_commits() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let input = vec![raw(json!({
            DOC_ID_KEY: "u1",
            "__data__": { "age": 99 }
        }))];
        let opts = UpdateOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = update_records(&store, &collection, &input, &opts).unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(report.commits, 0);
        assert_eq!(store.commit_count(), 0);
        assert_eq!(
            store.get("users/u1").unwrap().get("age"),
            Some(&Value::Int(30))
        );
    }
}
