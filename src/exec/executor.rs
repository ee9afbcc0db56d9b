// src/exec/executor.rs

//! Dependency-aware executor with a bounded worker pool.
//!
//! The executor is an async IO shell around the pure [`RunTracker`] core:
//! it dispatches ready nodes onto tokio tasks (at most `max_workers` in
//! flight), each task runs the node action and reports back over an mpsc
//! channel, and the event loop feeds every completion into the tracker to
//! unlock dependents. Node failures never abort the loop; the run ends only
//! when every node is terminal.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::{NodeStatus, RunReport, RunTracker, WorkflowDag};
use crate::exec::actions::{run_node, ExecContext};

/// Tuning knobs for the executor.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorOptions {
    /// Maximum number of node actions in flight at once.
    pub max_workers: usize,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

/// Run-wide cooperative stop signal.
///
/// Once raised, no node transitions into `Running`; nodes already running
/// finish normally and everything still waiting ends `Skipped`. There is no
/// rollback; undoing partial effects is the storage engine's concern.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Completion event sent by a worker task back to the event loop.
#[derive(Debug)]
struct NodeCompleted {
    name: String,
    outcome: Result<(), String>,
}

/// Executes one [`WorkflowDag`] to completion.
pub struct DagExecutor {
    dag: Arc<WorkflowDag>,
    ctx: Arc<ExecContext>,
    options: ExecutorOptions,
    tracker: RunTracker,
    stop: StopSignal,
}

impl DagExecutor {
    pub fn new(dag: Arc<WorkflowDag>, ctx: Arc<ExecContext>, options: ExecutorOptions) -> Self {
        let tracker = RunTracker::new(Arc::clone(&dag));
        Self {
            dag,
            ctx,
            options,
            tracker,
            stop: StopSignal::new(),
        }
    }

    /// Handle that can stop the run from outside the event loop.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Run every node to a terminal status and return the aggregated report.
    ///
    /// Returns only once no node remains pending, ready or running. Per-node
    /// failures are recorded in the report, never raised from here.
    pub async fn run(mut self) -> RunReport {
        let (tx, mut rx) = mpsc::channel::<NodeCompleted>(64);

        let mut ready: VecDeque<String> = self.tracker.take_ready().into_iter().collect();
        let mut running: usize = 0;

        info!(
            nodes = self.dag.len(),
            roots = ready.len(),
            max_workers = self.options.max_workers,
            "executor starting DAG run"
        );

        loop {
            while running < self.options.max_workers && !self.stop.is_raised() {
                let Some(name) = ready.pop_front() else { break };
                if self.dispatch(name, &tx) {
                    running += 1;
                }
            }

            if self.tracker.is_complete() {
                break;
            }

            if running == 0 {
                // Stop raised before the queue drained, or nothing left that
                // can ever become ready.
                let skipped = self.tracker.skip_remaining();
                if !skipped.is_empty() {
                    warn!(?skipped, "run ended with unexecuted nodes");
                }
                break;
            }

            match rx.recv().await {
                Some(done) => {
                    running -= 1;
                    self.apply_completion(done, &mut ready);
                }
                None => {
                    // Unreachable while we hold `tx`, but don't spin on it.
                    warn!("completion channel closed unexpectedly");
                    break;
                }
            }
        }

        let report = self.tracker.into_report();
        info!(
            succeeded = report
                .results()
                .filter(|r| r.status == NodeStatus::Succeeded)
                .count(),
            failed = report.failed().count(),
            skipped = report.skipped().count(),
            "executor finished DAG run"
        );
        report
    }

    /// Spawn one node action on a worker task. Returns false if the node
    /// could not be dispatched (recorded as a failure, not a panic).
    fn dispatch(&mut self, name: String, tx: &mpsc::Sender<NodeCompleted>) -> bool {
        let node = match self.dag.get(&name) {
            Some(n) => n.clone(),
            None => {
                warn!(node = %name, "ready node missing from DAG");
                self.tracker
                    .complete_failure(&name, "node missing from DAG");
                return false;
            }
        };

        self.tracker.start(&name);
        debug!(node = %name, kind = %node.kind, "dispatching node");

        let ctx = Arc::clone(&self.ctx);
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = run_node(&node, &ctx).await.map_err(|e| e.to_string());
            if tx
                .send(NodeCompleted {
                    name: node.name.clone(),
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(node = %node.name, "executor loop gone before completion was reported");
            }
        });

        true
    }

    fn apply_completion(&mut self, done: NodeCompleted, ready: &mut VecDeque<String>) {
        match done.outcome {
            Ok(()) => {
                info!(node = %done.name, "node succeeded");
                let newly_ready = self.tracker.complete_success(&done.name);
                ready.extend(newly_ready);
            }
            Err(reason) => {
                warn!(node = %done.name, reason = %reason, "node failed; skipping dependents");
                let skipped = self.tracker.complete_failure(&done.name, &reason);
                if !skipped.is_empty() {
                    debug!(upstream = %done.name, ?skipped, "dependents skipped");
                }
            }
        }
    }
}
