//! In-memory document store.
//!
//! Backs the test-suite and offline experiments (`DOCBATCH_BACKEND=memory`).
//! Documents live in one ordered map keyed by full document path, so
//! collection membership and subcollection listing fall out of plain key
//! prefix scans. Batches apply atomically under a single lock, and the
//! store counts its commits so cadence tests can observe them.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::model::{compare, Fields, Value};
use crate::path::StorePath;
use crate::query::{Operator, QueryCondition};
use crate::store::{
    DocumentPage, DocumentStore, StoreError, StoreQuery, StoredDocument, WriteBatch, WriteOp,
};

#[derive(Default)]
struct Inner {
    docs: BTreeMap<String, Fields>,
    commits: usize,
}

/// A `DocumentStore` holding everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document directly, bypassing the batch machinery.
    pub fn insert(&self, path: &str, fields: Fields) {
        let mut inner = self.inner.lock().expect("memory store lock");
        inner.docs.insert(path.to_string(), fields);
    }

    /// Fetch a document by full path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Fields> {
        let inner = self.inner.lock().expect("memory store lock");
        inner.docs.get(path).cloned()
    }

    /// Total number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("memory store lock");
        inner.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many batch commits this store has applied.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        let inner = self.inner.lock().expect("memory store lock");
        inner.commits
    }
}

/// Does `key` name a document directly inside `collection`?
fn direct_member(key: &str, collection_prefix: &str) -> bool {
    key.strip_prefix(collection_prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn matches(fields: &Fields, cond: &QueryCondition) -> bool {
    let Some(actual) = fields.get(&cond.field) else {
        return false;
    };
    let equal =
        |a: &Value, b: &Value| compare(a, b) == Some(std::cmp::Ordering::Equal);
    match cond.op {
        Operator::Eq => equal(actual, &cond.value),
        Operator::Neq => !equal(actual, &cond.value),
        Operator::Lt => compare(actual, &cond.value) == Some(std::cmp::Ordering::Less),
        Operator::Lte => matches!(
            compare(actual, &cond.value),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
        Operator::Gt => compare(actual, &cond.value) == Some(std::cmp::Ordering::Greater),
        Operator::Gte => matches!(
            compare(actual, &cond.value),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
        Operator::ArrayContains => match actual {
            Value::Array(items) => items.iter().any(|item| equal(item, &cond.value)),
            _ => false,
        },
        Operator::ArrayContainsAny => match (actual, &cond.value) {
            (Value::Array(items), Value::Array(wanted)) => items
                .iter()
                .any(|item| wanted.iter().any(|w| equal(item, w))),
            (Value::Array(items), single) => items.iter().any(|item| equal(item, single)),
            _ => false,
        },
        Operator::In => match &cond.value {
            Value::Array(wanted) => wanted.iter().any(|w| equal(actual, w)),
            single => equal(actual, single),
        },
    }
}

impl DocumentStore for MemoryStore {
    fn run_query(
        &self,
        collection: &StorePath,
        query: &StoreQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let inner = self.inner.lock().expect("memory store lock");
        let prefix = format!("{collection}/");

        let mut results: Vec<StoredDocument> = inner
            .docs
            .iter()
            .filter(|(key, _)| direct_member(key, &prefix))
            .filter(|(_, fields)| query.conditions.iter().all(|c| matches(fields, c)))
            .map(|(key, fields)| StoredDocument {
                id: key[prefix.len()..].to_string(),
                fields: fields.clone(),
            })
            .collect();

        if let Some(order_by) = &query.order_by {
            results.sort_by(|a, b| {
                let left = a.fields.get(order_by).unwrap_or(&Value::Null);
                let right = b.fields.get(order_by).unwrap_or(&Value::Null);
                compare(left, right).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("memory store lock");

        // validate strict updates up front so the batch applies atomically
        for op in batch.writes() {
            if let WriteOp::Update { doc, .. } = op {
                if !inner.docs.contains_key(&doc.to_string()) {
                    return Err(StoreError::NotFound {
                        path: doc.to_string(),
                    });
                }
            }
        }

        for op in batch.writes() {
            match op {
                WriteOp::Set {
                    doc,
                    fields,
                    merge,
                    stamp_field,
                } => {
                    let key = doc.to_string();
                    let mut next = if *merge {
                        inner.docs.get(&key).cloned().unwrap_or_default()
                    } else {
                        Fields::new()
                    };
                    next.extend(fields.clone());
                    if let Some(stamp) = stamp_field {
                        next.insert(stamp.clone(), Value::Timestamp(Utc::now()));
                    }
                    inner.docs.insert(key, next);
                }
                WriteOp::Update {
                    doc,
                    fields,
                    stamp_field,
                } => {
                    let key = doc.to_string();
                    let entry = inner.docs.entry(key).or_default();
                    entry.extend(fields.clone());
                    if let Some(stamp) = stamp_field {
                        entry.insert(stamp.clone(), Value::Timestamp(Utc::now()));
                    }
                }
                WriteOp::Delete { doc } => {
                    inner.docs.remove(&doc.to_string());
                }
            }
        }

        inner.commits += 1;
        Ok(())
    }

    fn list_collection_ids(
        &self,
        parent: Option<&StorePath>,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().expect("memory store lock");
        let prefix = parent.map_or(String::new(), |p| format!("{p}/"));

        // keys are sorted, so equal collection segments are adjacent
        let mut ids: Vec<String> = Vec::new();
        for key in inner.docs.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            // a document key always continues past its collection segment
            let Some((collection, _)) = rest.split_once('/') else {
                continue;
            };
            if ids.last().map(String::as_str) != Some(collection) {
                ids.push(collection.to_string());
            }
        }
        Ok(ids)
    }

    fn list_document_ids(
        &self,
        collection: &StorePath,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<DocumentPage, StoreError> {
        let inner = self.inner.lock().expect("memory store lock");
        let prefix = format!("{collection}/");

        let ids: Vec<String> = inner
            .docs
            .keys()
            .filter(|key| direct_member(key, &prefix))
            .map(|key| key[prefix.len()..].to_string())
            .filter(|id| page_token.is_none_or(|token| id.as_str() > token))
            .take(page_size)
            .collect();

        let next_page_token = if ids.len() == page_size {
            ids.last().cloned()
        } else {
            None
        };
        Ok(DocumentPage {
            ids,
            next_page_token,
        })
    }

    fn generate_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_condition;

    fn doc(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            "users/u1",
            doc(&[("age", Value::Int(30)), ("name", Value::String("Ada".into()))]),
        );
        store.insert(
            "users/u2",
            doc(&[("age", Value::Int(19)), ("name", Value::String("Bob".into()))]),
        );
        store.insert(
            "users/u3",
            doc(&[
                ("age", Value::Int(45)),
                ("tags", Value::Array(vec![Value::String("admin".into())])),
            ]),
        );
        // not a direct member of users/
        store.insert("users/u1/orders/o1", doc(&[("total", Value::Int(5))]));
        store
    }

    #[test]
    fn test_query_direct_members_only() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let docs = store
            .run_query(&collection, &StoreQuery::default())
            .unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn test_query_conditions_and_limit() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let query = StoreQuery {
            conditions: vec![parse_condition("age >= 21").unwrap()],
            order_by: Some("age".into()),
            limit: Some(1),
        };
        let docs = store.run_query(&collection, &query).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "u1");
    }

    #[test]
    fn test_query_array_contains() {
        let store = seeded();
        let collection = StorePath::parse_collection("users").unwrap();
        let query = StoreQuery {
            conditions: vec![parse_condition("tags array-contains admin").unwrap()],
            ..Default::default()
        };
        let docs = store.run_query(&collection, &query).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "u3");
    }

    #[test]
    fn test_commit_set_and_delete() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Set {
            doc: StorePath::parse_document("users/u1").unwrap(),
            fields: doc(&[("a", Value::Int(1))]),
            merge: false,
            stamp_field: None,
        });
        store.commit(batch).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.commit_count(), 1);

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Delete {
            doc: StorePath::parse_document("users/u1").unwrap(),
        });
        store.commit(batch).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_strict_update_missing_doc_fails_batch() {
        let store = seeded();
        let before = store.len();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Set {
            doc: StorePath::parse_document("users/u9").unwrap(),
            fields: doc(&[("a", Value::Int(1))]),
            merge: false,
            stamp_field: None,
        });
        batch.push(WriteOp::Update {
            doc: StorePath::parse_document("users/ghost").unwrap(),
            fields: doc(&[("a", Value::Int(1))]),
            stamp_field: None,
        });
        let err = store.commit(batch).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        // atomic: the set in the same batch did not apply
        assert_eq!(store.len(), before);
    }

    #[test]
    fn test_merge_set_keeps_other_fields() {
        let store = seeded();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Set {
            doc: StorePath::parse_document("users/u1").unwrap(),
            fields: doc(&[("age", Value::Int(31))]),
            merge: true,
            stamp_field: None,
        });
        store.commit(batch).unwrap();
        let fields = store.get("users/u1").unwrap();
        assert_eq!(fields.get("age"), Some(&Value::Int(31)));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_stamp_field_is_filled() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Set {
            doc: StorePath::parse_document("users/u1").unwrap(),
            fields: Fields::new(),
            merge: false,
            stamp_field: Some("created_at".into()),
        });
        store.commit(batch).unwrap();
        let fields = store.get("users/u1").unwrap();
        assert!(matches!(fields.get("created_at"), Some(Value::Timestamp(_))));
    }

    #[test]
    fn test_list_collection_ids_root_and_nested() {
        let store = seeded();
        assert_eq!(store.list_collection_ids(None).unwrap(), ["users"]);

        let parent = StorePath::parse_document("users/u1").unwrap();
        assert_eq!(
            store.list_collection_ids(Some(&parent)).unwrap(),
            ["orders"]
        );

        let leaf = StorePath::parse_document("users/u2").unwrap();
        assert!(store.list_collection_ids(Some(&leaf)).unwrap().is_empty());
    }

    #[test]
    fn test_list_document_ids_pages() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(&format!("items/d{i}"), Fields::new());
        }
        let collection = StorePath::parse_collection("items").unwrap();

        let first = store.list_document_ids(&collection, 2, None).unwrap();
        assert_eq!(first.ids, ["d0", "d1"]);
        let token = first.next_page_token.unwrap();

        let second = store
            .list_document_ids(&collection, 2, Some(&token))
            .unwrap();
        assert_eq!(second.ids, ["d2", "d3"]);

        let third = store
            .list_document_ids(&collection, 2, second.next_page_token.as_deref())
            .unwrap();
        assert_eq!(third.ids, ["d4"]);
        assert!(third.next_page_token.is_none());
    }
}
