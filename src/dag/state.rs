// src/dag/state.rs

//! Per-run execution state: node statuses and the pure scheduling core.
//!
//! `RunTracker` is synchronous and deterministic; the async executor in
//! `exec::executor` is a thin IO shell around it. Keeping the semantics here
//! means dependency ordering, skip propagation and termination can be unit
//! tested without tokio, channels or a table backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::dag::WorkflowDag;

/// Lifecycle of a single node within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Waiting on unfinished dependencies.
    Pending,
    /// All dependencies succeeded; eligible for dispatch.
    Ready,
    /// Action in flight on a worker.
    Running,
    Succeeded,
    Failed,
    /// Never executed because an upstream node failed or the run stopped.
    Skipped,
}

impl NodeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeStatus::Succeeded | NodeStatus::Failed | NodeStatus::Skipped
        )
    }
}

/// Outcome of one node for reporting.
#[derive(Debug, Clone)]
pub struct NodeResult {
    pub name: String,
    pub status: NodeStatus,
    /// Failure or skip reason, when the node did not succeed.
    pub error: Option<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl NodeResult {
    fn new(name: String) -> Self {
        Self {
            name,
            status: NodeStatus::Pending,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(s), Some(f)) => Some(f.duration_since(s)),
            _ => None,
        }
    }
}

/// Pure per-run state machine over a [`WorkflowDag`].
///
/// Tracks an indegree counter per node (unfinished dependencies) and drives
/// the Pending → Ready → Running → terminal transitions. Failure marks every
/// transitive dependent `Skipped` instead of aborting the run, so independent
/// branches still execute and a single run yields maximal diagnostics.
#[derive(Debug)]
pub struct RunTracker {
    dag: Arc<WorkflowDag>,
    results: BTreeMap<String, NodeResult>,
    indegree: HashMap<String, usize>,
}

impl RunTracker {
    pub fn new(dag: Arc<WorkflowDag>) -> Self {
        let results = dag
            .names()
            .map(|name| (name.to_string(), NodeResult::new(name.to_string())))
            .collect();
        let indegree = dag
            .nodes()
            .map(|node| (node.name.clone(), node.deps.len()))
            .collect();

        Self {
            dag,
            results,
            indegree,
        }
    }

    /// Drain all pending nodes with no unfinished dependencies, marking them
    /// `Ready`. Deterministic order (sorted by name).
    pub fn take_ready(&mut self) -> Vec<String> {
        let ready: Vec<String> = self
            .results
            .values()
            .filter(|r| {
                r.status == NodeStatus::Pending
                    && self.indegree.get(&r.name).copied().unwrap_or(0) == 0
            })
            .map(|r| r.name.clone())
            .collect();

        for name in &ready {
            if let Some(r) = self.results.get_mut(name) {
                r.status = NodeStatus::Ready;
                debug!(node = %name, "node ready: all dependencies satisfied");
            }
        }

        ready
    }

    /// Mark a ready node as running.
    pub fn start(&mut self, name: &str) {
        match self.results.get_mut(name) {
            Some(r) if r.status == NodeStatus::Ready => {
                r.status = NodeStatus::Running;
                r.started_at = Some(Instant::now());
            }
            Some(r) => {
                warn!(node = %name, status = ?r.status, "start called on non-ready node");
            }
            None => warn!(node = %name, "start called on unknown node"),
        }
    }

    /// Mark a running node as succeeded; returns dependents that became
    /// ready as a result.
    pub fn complete_success(&mut self, name: &str) -> Vec<String> {
        if let Some(r) = self.results.get_mut(name) {
            r.status = NodeStatus::Succeeded;
            r.finished_at = Some(Instant::now());
        } else {
            warn!(node = %name, "completion for unknown node; ignoring");
            return Vec::new();
        }

        let mut newly_ready = Vec::new();
        for dependent in self.dag.dependents_of(name).to_vec() {
            let remaining = match self.indegree.get_mut(&dependent) {
                Some(d) => {
                    *d = d.saturating_sub(1);
                    *d
                }
                None => continue,
            };

            if remaining == 0 {
                if let Some(r) = self.results.get_mut(&dependent) {
                    if r.status == NodeStatus::Pending {
                        r.status = NodeStatus::Ready;
                        debug!(node = %dependent, "node ready: all dependencies satisfied");
                        newly_ready.push(dependent);
                    }
                }
            }
        }

        newly_ready
    }

    /// Mark a running node as failed and every transitive dependent as
    /// `Skipped`. Returns the skipped node names.
    pub fn complete_failure(&mut self, name: &str, reason: &str) -> Vec<String> {
        if let Some(r) = self.results.get_mut(name) {
            r.status = NodeStatus::Failed;
            r.error = Some(reason.to_string());
            r.finished_at = Some(Instant::now());
        } else {
            warn!(node = %name, "failure for unknown node; ignoring");
            return Vec::new();
        }

        let mut stack: Vec<String> = self.dag.dependents_of(name).to_vec();
        let mut skipped = Vec::new();

        while let Some(dep_name) = stack.pop() {
            if let Some(r) = self.results.get_mut(&dep_name) {
                match r.status {
                    NodeStatus::Pending | NodeStatus::Ready => {
                        r.status = NodeStatus::Skipped;
                        r.error = Some(format!("skipped: upstream node '{}' failed", name));
                        debug!(
                            node = %dep_name,
                            upstream = %name,
                            "skipping dependent of failed node"
                        );
                        skipped.push(dep_name.clone());
                        stack.extend(self.dag.dependents_of(&dep_name).to_vec());
                    }
                    // Already terminal, or running on another branch join.
                    _ => {}
                }
            }
        }

        skipped
    }

    /// Skip every node that has not started. Used when a stop signal is
    /// raised: running nodes finish, nothing new starts.
    pub fn skip_remaining(&mut self) -> Vec<String> {
        let mut skipped = Vec::new();
        for r in self.results.values_mut() {
            if matches!(r.status, NodeStatus::Pending | NodeStatus::Ready) {
                r.status = NodeStatus::Skipped;
                r.error = Some("skipped: run stopped".to_string());
                skipped.push(r.name.clone());
            }
        }
        skipped
    }

    /// True once every node reached a terminal status.
    pub fn is_complete(&self) -> bool {
        self.results.values().all(|r| r.status.is_terminal())
    }

    pub fn status_of(&self, name: &str) -> Option<NodeStatus> {
        self.results.get(name).map(|r| r.status)
    }

    pub fn into_report(self) -> RunReport {
        RunReport {
            results: self.results,
        }
    }
}

/// Aggregated per-node outcomes of one executor run.
#[derive(Debug, Clone)]
pub struct RunReport {
    results: BTreeMap<String, NodeResult>,
}

impl RunReport {
    pub fn results(&self) -> impl Iterator<Item = &NodeResult> {
        self.results.values()
    }

    pub fn status_of(&self, name: &str) -> Option<NodeStatus> {
        self.results.get(name).map(|r| r.status)
    }

    /// The run is judged successful only if every node succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.results
            .values()
            .all(|r| r.status == NodeStatus::Succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &NodeResult> {
        self.results
            .values()
            .filter(|r| r.status == NodeStatus::Failed)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &NodeResult> {
        self.results
            .values()
            .filter(|r| r.status == NodeStatus::Skipped)
    }

    /// Count of write-capability nodes that reached `Succeeded`; this is the
    /// expected number of new write commits on the table timeline.
    pub fn succeeded_writes(&self, dag: &WorkflowDag) -> usize {
        self.results
            .values()
            .filter(|r| r.status == NodeStatus::Succeeded)
            .filter(|r| dag.get(&r.name).map(|n| n.kind.is_write()).unwrap_or(false))
            .count()
    }
}
