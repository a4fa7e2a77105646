//! The batched read/write/update/delete pipeline.
//!
//! Each operation is a free function over a [`DocumentStore`]: the command
//! layer resolves paths and loads input, the pipeline transforms records
//! and paces commits. All progress accounting is threaded through the
//! [`Batcher`] and returned in a report; nothing is ambient.

pub mod delete;
pub mod list;
pub mod read;
pub mod update;
pub mod write;

pub use delete::{delete_documents, extract_doc_ids, DeleteReport};
pub use list::list_collections;
pub use read::{read_collection, ReadOptions};
pub use update::{update_records, UpdateOptions, UpdateReport};
pub use write::{write_records, WriteOptions, WriteReport};

use tracing::{debug, info};

use crate::error::Result;
use crate::store::{DocumentStore, WriteBatch, WriteOp, MAX_BATCH_SIZE};

/// Paces mutations into batches of at most [`MAX_BATCH_SIZE`] ops.
///
/// The batcher exclusively owns the open batch for one pipeline
/// invocation: ops accumulate, a full batch commits and a fresh one opens,
/// and [`Batcher::flush`] commits the trailing partial batch. With
/// `dry_run` every count still advances but no commit reaches the store.
pub struct Batcher<'a> {
    store: &'a dyn DocumentStore,
    open: WriteBatch,
    dry_run: bool,
    records: usize,
    commits: usize,
}

impl<'a> Batcher<'a> {
    pub fn new(store: &'a dyn DocumentStore, dry_run: bool) -> Self {
        Self {
            store,
            open: WriteBatch::new(),
            dry_run,
            records: 0,
            commits: 0,
        }
    }

    /// Queue one mutation, committing when the open batch fills up.
    pub fn push(&mut self, op: WriteOp) -> Result<()> {
        self.open.push(op);
        if self.open.len() == MAX_BATCH_SIZE {
            self.commit_open()?;
        }
        Ok(())
    }

    /// Commit whatever is left in the open batch.
    pub fn flush(&mut self) -> Result<()> {
        if !self.open.is_empty() {
            self.commit_open()?;
        }
        Ok(())
    }

    fn commit_open(&mut self) -> Result<()> {
        let batch = std::mem::take(&mut self.open);
        let size = batch.len();
        if self.dry_run {
            debug!(size, "dry run, skipping commit");
        } else {
            self.store.commit(batch)?;
            self.commits += 1;
            info!(size, total = self.records + size, "committed batch");
        }
        self.records += size;
        Ok(())
    }

    /// Records pushed through committed (or dry-run skipped) batches.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Batch commits actually issued against the store.
    #[must_use]
    pub fn commits(&self) -> usize {
        self.commits
    }
}
