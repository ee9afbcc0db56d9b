// src/store/mock.rs

//! In-memory reference engine implementing [`StorageBackend`].
//!
//! Used by the integration tests and the CLI's local mode. It models the
//! externally observable contract of a transactional table format:
//! - one atomic write commit per accepted write request,
//! - a single concurrent writer (commits never interleave),
//! - schema-checked writes,
//! - for merge-on-read tables, engine-internal compaction instants appended
//!   after every `compact_after` write commits.
//!
//! It intentionally models nothing else: no durability, no file layout, no
//! deduplication.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{LakebenchError, Result};
use crate::store::{
    BoxFuture, CatalogSyncRequest, CommitId, CommitKind, CommitRecord, Record, StorageBackend,
    TableSnapshot, WriteRequest,
};
use crate::types::{TableType, WriteMode};

/// Construction options for [`InMemoryTable`].
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub table_type: TableType,
    /// Schema the table accepts; batches with any other schema fail.
    pub schema: String,
    /// Merge-on-read only: compact after this many write commits. 0 disables.
    pub compact_after: usize,
    /// Artificial latency per write, for cancellation tests.
    pub write_delay: Option<Duration>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            table_type: TableType::CopyOnWrite,
            schema: "source".to_string(),
            compact_after: 3,
            write_delay: None,
        }
    }
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Record>,
    timeline: Vec<CommitRecord>,
    files: u64,
    writes_since_compaction: usize,
    next_instant: u64,
    synced_catalogs: Vec<String>,
}

impl TableState {
    fn next_instant(&mut self) -> CommitId {
        self.next_instant += 1;
        format!("{:08}", self.next_instant)
    }
}

/// In-memory table with an append-only timeline.
#[derive(Debug)]
pub struct InMemoryTable {
    opts: TableOptions,
    // One writer at a time: the commit section holds this across the whole
    // apply-and-append, so commits are atomic from the harness's view.
    state: Mutex<TableState>,
}

impl InMemoryTable {
    pub fn new(opts: TableOptions) -> Self {
        Self {
            opts,
            state: Mutex::new(TableState::default()),
        }
    }

    pub fn copy_on_write() -> Self {
        Self::new(TableOptions::default())
    }

    pub fn merge_on_read() -> Self {
        Self::new(TableOptions {
            table_type: TableType::MergeOnRead,
            ..TableOptions::default()
        })
    }

    /// Register a pre-existing write commit, modelling table state created
    /// by earlier setup outside the run under test.
    pub async fn seed_commit(&self, rows: usize) {
        let mut state = self.state.lock().await;
        let instant = state.next_instant();
        for i in 0..rows {
            state.rows.push(Record {
                key: format!("seed-{:08}", i),
                partition: "p0".to_string(),
                payload: 0,
            });
        }
        state.files += 1;
        state.timeline.push(CommitRecord {
            instant,
            kind: CommitKind::Write,
            rows,
        });
    }

    /// Write commits currently on the timeline (test helper).
    pub async fn write_commit_count(&self) -> usize {
        let state = self.state.lock().await;
        crate::store::write_commit_count(&state.timeline)
    }

    /// Catalogs that received a metadata sync, in sync order (test helper).
    pub async fn synced_catalogs(&self) -> Vec<String> {
        self.state.lock().await.synced_catalogs.clone()
    }

    fn apply_write(&self, state: &mut TableState, req: &WriteRequest) -> Result<CommitId> {
        if req.batch.schema != self.opts.schema {
            return Err(LakebenchError::Other(anyhow::anyhow!(
                "schema mismatch: table expects '{}', batch has '{}'",
                self.opts.schema,
                req.batch.schema
            )));
        }
        if req.batch.is_empty() {
            return Err(LakebenchError::Other(anyhow::anyhow!(
                "rejecting empty write batch"
            )));
        }

        let mut touched_partitions: Vec<&str> = Vec::new();
        for record in req.batch.rows.iter() {
            if !touched_partitions.contains(&record.partition.as_str()) {
                touched_partitions.push(record.partition.as_str());
            }

            match req.mode {
                WriteMode::Insert => state.rows.push(record.clone()),
                WriteMode::Upsert => {
                    match state.rows.iter_mut().find(|r| r.key == record.key) {
                        Some(existing) => *existing = record.clone(),
                        None => state.rows.push(record.clone()),
                    }
                }
            }
        }

        state.files += touched_partitions.len() as u64;
        let instant = state.next_instant();
        state.timeline.push(CommitRecord {
            instant: instant.clone(),
            kind: CommitKind::Write,
            rows: req.batch.len(),
        });
        state.writes_since_compaction += 1;

        info!(
            commit = %instant,
            mode = %req.mode,
            rows = req.batch.len(),
            "write committed"
        );

        self.maybe_compact(state);

        Ok(instant)
    }

    fn maybe_compact(&self, state: &mut TableState) {
        if self.opts.table_type != TableType::MergeOnRead {
            return;
        }
        if self.opts.compact_after == 0
            || state.writes_since_compaction < self.opts.compact_after
        {
            return;
        }

        let instant = state.next_instant();
        let rows = state.rows.len();
        state.timeline.push(CommitRecord {
            instant: instant.clone(),
            kind: CommitKind::Compaction,
            rows,
        });
        state.writes_since_compaction = 0;
        debug!(instant = %instant, "inline compaction instant appended");
    }
}

impl StorageBackend for InMemoryTable {
    fn write_batch(&self, req: WriteRequest) -> BoxFuture<'_, Result<CommitId>> {
        Box::pin(async move {
            if let Some(delay) = self.opts.write_delay {
                tokio::time::sleep(delay).await;
            }
            let mut state = self.state.lock().await;
            self.apply_write(&mut state, &req)
        })
    }

    fn timeline(&self) -> BoxFuture<'_, Result<Vec<CommitRecord>>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(state.timeline.clone())
        })
    }

    fn sync_catalog(&self, req: CatalogSyncRequest) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            debug!(catalog = %req.catalog, table_path = %req.table_path, "catalog sync");
            state.synced_catalogs.push(req.catalog);
            Ok(())
        })
    }

    fn snapshot(&self) -> BoxFuture<'_, Result<TableSnapshot>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(TableSnapshot {
                rows: state.rows.len() as u64,
                files: state.files,
                write_commits: crate::store::write_commit_count(&state.timeline) as u64,
                schema: self.opts.schema.clone(),
            })
        })
    }
}
