// src/errors.rs

//! Crate-wide error taxonomy and helpers.
//!
//! Three families matter to callers:
//! - `Config` / `DagCycle` are fatal and raised before any node executes,
//! - `Execution` is recorded per node and never aborts the run as a whole,
//! - `Validation` is raised after the run when the observed commit timeline
//!   does not match what the executed write nodes imply.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LakebenchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cycle detected in workload DAG: {0}")]
    DagCycle(String),

    #[error("node '{node}' failed: {reason}")]
    Execution { node: String, reason: String },

    #[error(
        "timeline validation failed: expected {expected} new write commits, observed {observed}"
    )]
    Validation { expected: usize, observed: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LakebenchError>;
