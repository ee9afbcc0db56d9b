// src/dag/mod.rs

//! Workload DAG representation and the pure per-run state machine.
//!
//! - [`node`] defines the node model: capability kinds, typed configuration
//!   and validation predicates.
//! - [`graph`] holds the immutable [`WorkflowDag`] with derived adjacency.
//! - [`state`] contains the synchronous `RunTracker` that decides which nodes
//!   are ready, propagates success, and skips dependents of failed nodes.

pub mod graph;
pub mod node;
pub mod state;

pub use graph::WorkflowDag;
pub use node::{DagNode, NodeConfig, NodeKind, Predicate};
pub use state::{NodeResult, NodeStatus, RunReport, RunTracker};
