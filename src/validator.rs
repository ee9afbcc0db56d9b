// src/validator.rs

//! Post-run timeline validation.
//!
//! After the executor finishes, the table's active timeline must have grown
//! by exactly one write commit per write-capability node that succeeded.
//! Exact equality, not a lower bound: extra commits are as much a bug as
//! missing ones. Compaction instants are engine-internal and never counted.

use std::sync::Arc;

use tracing::{debug, info};

use crate::dag::{RunReport, WorkflowDag};
use crate::errors::{LakebenchError, Result};
use crate::store::{write_commit_count, StorageBackend};

/// Validates the commit timeline of one run against the executed DAG.
///
/// Capture the baseline *before* execution so that commits present from
/// earlier setup never count against the run.
#[derive(Debug, Clone, Copy)]
pub struct TimelineValidator {
    baseline_write_commits: usize,
}

impl TimelineValidator {
    /// Snapshot the pre-run write-commit count.
    pub async fn capture(backend: &Arc<dyn StorageBackend>) -> Result<Self> {
        let timeline = backend.timeline().await?;
        let baseline_write_commits = write_commit_count(&timeline);
        debug!(baseline_write_commits, "captured pre-run timeline baseline");
        Ok(Self {
            baseline_write_commits,
        })
    }

    pub fn baseline(&self) -> usize {
        self.baseline_write_commits
    }

    /// Assert observed new write commits == succeeded write nodes.
    pub async fn check(
        &self,
        dag: &WorkflowDag,
        report: &RunReport,
        backend: &Arc<dyn StorageBackend>,
    ) -> Result<()> {
        let expected = report.succeeded_writes(dag);

        let timeline = backend.timeline().await?;
        let observed = write_commit_count(&timeline).saturating_sub(self.baseline_write_commits);

        if observed != expected {
            return Err(LakebenchError::Validation { expected, observed });
        }

        info!(
            expected,
            observed, "timeline validation passed: commit count matches succeeded write nodes"
        );
        Ok(())
    }
}
