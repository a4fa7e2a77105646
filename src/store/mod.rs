//! The remote document store seam.
//!
//! Everything the pipeline needs from a store fits four capabilities:
//! running a collection query, committing a bounded write batch
//! atomically, listing collection ids, and paging document ids. The
//! [`DocumentStore`] trait captures exactly that, so the pipeline code is
//! identical whether it talks to the Firestore REST API
//! ([`firestore::FirestoreStore`]) or the in-memory backend
//! ([`memory::MemoryStore`]) that drives the test-suite.

pub mod firestore;
pub mod memory;
pub mod wire;

use thiserror::Error;

use crate::model::Fields;
use crate::path::StorePath;
use crate::query::QueryCondition;

/// Hard per-batch document ceiling of the remote store.
pub const MAX_BATCH_SIZE: usize = 500;

/// Page size used when listing collection ids from the backend.
pub const LIST_PAGE_SIZE: usize = 300;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {path}")]
    NotFound { path: String },

    #[error("authentication with the document store failed: {message}")]
    Auth { message: String },

    #[error("could not reach the document store: {message}")]
    Transport { message: String },

    #[error("unexpected response from the document store: {message}")]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// One mutation inside a batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create or replace a document. With `merge`, existing fields not
    /// named in `fields` survive (upsert semantics).
    Set {
        doc: StorePath,
        fields: Fields,
        merge: bool,
        /// Field the store fills with its server-generated commit time.
        stamp_field: Option<String>,
    },
    /// Strict field update: fails the batch with [`StoreError::NotFound`]
    /// when the document does not exist.
    Update {
        doc: StorePath,
        fields: Fields,
        stamp_field: Option<String>,
    },
    /// Delete a document. Deleting an absent document is not an error.
    Delete { doc: StorePath },
}

/// A bounded group of mutations committed atomically.
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mutation. Callers keep batches within [`MAX_BATCH_SIZE`];
    /// the pipeline's batcher commits and reopens before that point.
    pub fn push(&mut self, op: WriteOp) {
        debug_assert!(self.writes.len() < MAX_BATCH_SIZE);
        self.writes.push(op);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    #[must_use]
    pub fn writes(&self) -> &[WriteOp] {
        &self.writes
    }
}

/// A collection query: ANDed conditions, optional single-field ordering,
/// optional result ceiling.
#[derive(Debug, Clone, Default)]
pub struct StoreQuery {
    pub conditions: Vec<QueryCondition>,
    pub order_by: Option<String>,
    pub limit: Option<usize>,
}

/// A document as returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

/// One page of document ids from [`DocumentStore::list_document_ids`].
#[derive(Debug, Clone, Default)]
pub struct DocumentPage {
    pub ids: Vec<String>,
    /// Opaque continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Capabilities the pipeline consumes from the remote store.
pub trait DocumentStore {
    /// Run a query against one collection, returning matching documents.
    fn run_query(
        &self,
        collection: &StorePath,
        query: &StoreQuery,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Commit a batch atomically. A strict update against a missing
    /// document fails the whole batch with [`StoreError::NotFound`].
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Collection ids under a document, or the root collections when
    /// `parent` is `None`.
    fn list_collection_ids(&self, parent: Option<&StorePath>)
        -> Result<Vec<String>, StoreError>;

    /// Page through the document ids of one collection.
    fn list_document_ids(
        &self,
        collection: &StorePath,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<DocumentPage, StoreError>;

    /// A fresh store-assigned document id.
    fn generate_id(&self) -> String;
}
