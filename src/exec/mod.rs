// src/exec/mod.rs

//! Node execution layer.
//!
//! - [`actions`] maps each node kind to its semantic unit of work against the
//!   storage backend, and owns the run-scoped [`actions::ExecContext`].
//! - [`executor`] schedules ready nodes onto a bounded worker pool and feeds
//!   completions back into the pure `RunTracker` core.

pub mod actions;
pub mod executor;

pub use actions::ExecContext;
pub use executor::{DagExecutor, ExecutorOptions, StopSignal};
