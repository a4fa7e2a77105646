//! Bulk document deletion with recursive subtree sweeps.

use serde_json::Value as Json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::RawRecord;
use crate::model::DOC_ID_KEY;
use crate::path::StorePath;
use crate::pipeline::Batcher;
use crate::store::{DocumentStore, WriteOp};

/// Documents fetched per subcollection page during a recursive sweep.
/// Keeps memory bounded regardless of subtree size.
const DELETE_PAGE_SIZE: usize = 100;

/// Outcome of a delete or dry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Documents deleted (or planned, in a dry run), descendants included.
    pub documents: usize,
    /// Batch commits issued against the store; 0 in a dry run.
    pub commits: usize,
}

/// Pull deletable document ids out of parsed input records.
///
/// Only `__doc_id__` fields count; a file exported with `--raw` has none
/// and fails with [`Error::MissingDocumentIds`].
pub fn extract_doc_ids(records: &[RawRecord]) -> Result<Vec<String>> {
    let ids: Vec<String> = records
        .iter()
        .filter_map(|record| record.get(DOC_ID_KEY))
        .filter_map(Json::as_str)
        .map(String::from)
        .collect();
    if ids.is_empty() {
        return Err(Error::MissingDocumentIds);
    }
    Ok(ids)
}

/// Delete the named documents from `collection`, each with its whole
/// subcollection tree.
///
/// The sweep is depth-first and paged: every document in every
/// subcollection is queued before its parent, so by the time a parent
/// delete commits its descendants are already gone or in the same batch.
/// The sweep is not transactional: a crash mid-run leaves the documents
/// of already-committed batches deleted and can orphan subtree remainders.
pub fn delete_documents(
    store: &dyn DocumentStore,
    collection: &StorePath,
    ids: &[String],
    dry_run: bool,
) -> Result<DeleteReport> {
    let mut batcher = Batcher::new(store, dry_run);
    for id in ids {
        delete_tree(store, &mut batcher, &collection.child(id))?;
    }
    batcher.flush()?;
    Ok(DeleteReport {
        documents: batcher.records(),
        commits: batcher.commits(),
    })
}

/// Queue `doc` and everything beneath it, children first.
fn delete_tree(
    store: &dyn DocumentStore,
    batcher: &mut Batcher<'_>,
    doc: &StorePath,
) -> Result<()> {
    for collection_id in store.list_collection_ids(Some(doc))? {
        let subcollection = doc.child(&collection_id);
        let mut page_token: Option<String> = None;
        loop {
            let page = store.list_document_ids(
                &subcollection,
                DELETE_PAGE_SIZE,
                page_token.as_deref(),
            )?;
            for child_id in &page.ids {
                delete_tree(store, batcher, &subcollection.child(child_id))?;
            }
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }
    }
    debug!(%doc, "queueing delete");
    batcher.push(WriteOp::Delete { doc: doc.clone() })
}
