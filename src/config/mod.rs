// src/config/mod.rs

//! Workload specification loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a workload document from disk (`loader.rs`).
//! - Validate semantic invariants: dependency resolution, per-kind field
//!   requirements, DAG acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{NodeSpec, RawWorkloadFile, SuiteSection, WorkloadFile};
