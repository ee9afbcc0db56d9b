// src/store/mod.rs

//! Interfaces to the external storage engine and catalog.
//!
//! The harness only *consumes* these: it submits write batches, reads the
//! commit timeline, and asks for catalog syncs. Commit atomicity, durability
//! and compaction scheduling are the engine's problem, never replicated here.
//!
//! [`StorageBackend`] is the seam the executor talks through; production
//! deployments plug a real engine in, while tests and the CLI's local mode
//! use the in-memory reference engine in [`mock`].

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::WriteMode;

pub mod mock;

pub use mock::{InMemoryTable, TableOptions};

/// Boxed future type used by [`StorageBackend`] so the trait stays object
/// safe and test implementations don't need a macro crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Identifier of a committed instant on the table timeline.
pub type CommitId = String;

/// Type tag of a timeline instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// A commit produced by an accepted write request.
    Write,
    /// An engine-internal compaction instant (merge-on-read tables).
    Compaction,
}

/// One committed instant on the table's active timeline. The timeline is
/// ordered and append-only; the harness reads it and never writes to it.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub instant: CommitId,
    pub kind: CommitKind,
    /// Rows touched by this instant.
    pub rows: usize,
}

/// Externally observable table state for validate nodes.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub rows: u64,
    pub files: u64,
    /// Write commits only; compaction instants are excluded.
    pub write_commits: u64,
    pub schema: String,
}

/// A synthetic record.
#[derive(Debug, Clone)]
pub struct Record {
    pub key: String,
    pub partition: String,
    pub payload: u64,
}

/// A batch of records conforming to one schema.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub schema: String,
    pub rows: Vec<Record>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A write request: one batch plus the mode to apply it with.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub mode: WriteMode,
    pub batch: RecordBatch,
}

/// A catalog sync request: table metadata location plus catalog identity.
#[derive(Debug, Clone)]
pub struct CatalogSyncRequest {
    pub table_path: String,
    pub catalog: String,
}

/// The storage engine and catalog surface consumed by node actions.
pub trait StorageBackend: Send + Sync {
    /// Apply a batch of records. Success means exactly one new write commit
    /// registered on the timeline, returned by id.
    fn write_batch(&self, req: WriteRequest) -> BoxFuture<'_, Result<CommitId>>;

    /// The active commit timeline, in commit order.
    fn timeline(&self) -> BoxFuture<'_, Result<Vec<CommitRecord>>>;

    /// Push current table metadata to an external catalog.
    fn sync_catalog(&self, req: CatalogSyncRequest) -> BoxFuture<'_, Result<()>>;

    /// Externally observable table state.
    fn snapshot(&self) -> BoxFuture<'_, Result<TableSnapshot>>;
}

/// Count the write commits in a timeline, ignoring compaction instants.
pub fn write_commit_count(timeline: &[CommitRecord]) -> usize {
    timeline
        .iter()
        .filter(|c| c.kind == CommitKind::Write)
        .count()
}
