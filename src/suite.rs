// src/suite.rs

//! End-to-end test orchestrator.
//!
//! The thinnest layer: capture the timeline baseline, run the executor over
//! the DAG, aggregate node outcomes, then run the timeline validator. Node
//! failures and validation mismatches surface as distinct outcomes; both
//! fail the suite.

use std::sync::Arc;

use tracing::{info, warn};

use crate::dag::{NodeStatus, RunReport, WorkflowDag};
use crate::errors::{LakebenchError, Result};
use crate::exec::{DagExecutor, ExecContext, ExecutorOptions};
use crate::validator::TimelineValidator;

/// One failed or skipped node in the final outcome.
#[derive(Debug, Clone)]
pub struct NodeFailure {
    pub node: String,
    pub status: NodeStatus,
    pub reason: String,
}

/// Aggregate result of one suite run.
#[derive(Debug, Clone)]
pub enum SuiteOutcome {
    /// Every node succeeded and the timeline matched.
    Success,
    /// At least one node failed or was skipped; lists every one of them.
    Failure(Vec<NodeFailure>),
    /// All nodes succeeded but the timeline did not match.
    ValidationFailure { expected: usize, observed: usize },
}

impl SuiteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SuiteOutcome::Success)
    }
}

/// Outcome plus the full per-node report, for diagnostics and tests.
#[derive(Debug)]
pub struct SuiteReport {
    pub outcome: SuiteOutcome,
    pub report: RunReport,
}

/// Build → execute → validate.
///
/// Node-level failures are contained by the executor; the only errors raised
/// from here are infrastructure failures reading the timeline.
pub async fn run_suite(
    dag: Arc<WorkflowDag>,
    ctx: Arc<ExecContext>,
    options: ExecutorOptions,
) -> Result<SuiteReport> {
    let validator = TimelineValidator::capture(&ctx.backend).await?;

    let executor = DagExecutor::new(Arc::clone(&dag), Arc::clone(&ctx), options);
    let report = executor.run().await;

    // Validate even when nodes failed: the commit count must still match the
    // writes that did succeed, and logging the result maximizes diagnostics.
    let validation = validator.check(&dag, &report, &ctx.backend).await;

    if !report.all_succeeded() {
        let failures: Vec<NodeFailure> = report
            .results()
            .filter(|r| matches!(r.status, NodeStatus::Failed | NodeStatus::Skipped))
            .map(|r| NodeFailure {
                node: r.name.clone(),
                status: r.status,
                reason: r.error.clone().unwrap_or_default(),
            })
            .collect();

        if let Err(e) = &validation {
            warn!(error = %e, "timeline mismatch in addition to node failures");
        }

        warn!(count = failures.len(), "suite failed: nodes did not all succeed");
        return Ok(SuiteReport {
            outcome: SuiteOutcome::Failure(failures),
            report,
        });
    }

    let outcome = match validation {
        Ok(()) => {
            info!("suite succeeded: all nodes ran and the timeline matches");
            SuiteOutcome::Success
        }
        Err(LakebenchError::Validation { expected, observed }) => {
            warn!(expected, observed, "suite failed timeline validation");
            SuiteOutcome::ValidationFailure { expected, observed }
        }
        Err(other) => return Err(other),
    };

    Ok(SuiteReport { outcome, report })
}
