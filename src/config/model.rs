// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dag::node::NodeKind;
use crate::types::TableType;

/// Top-level workload specification as read from a TOML file.
///
/// ```toml
/// [suite]
/// table_type = "merge_on_read"
/// max_workers = 4
///
/// [node.insert_1]
/// kind = "insert"
/// records = 100
///
/// [node.upsert_1]
/// kind = "upsert"
/// depends_on = ["insert_1"]
/// records = 50
/// ```
///
/// This is the *raw* model: it maps the document one-to-one and performs no
/// semantic checks. Use [`WorkloadFile::try_from`] (or
/// [`crate::config::load_and_validate`]) to obtain a validated workload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkloadFile {
    /// Target-table and run settings from `[suite]`.
    #[serde(default)]
    pub suite: SuiteSection,

    /// All workload nodes from `[node.<name>]`.
    ///
    /// Keys are the node names (e.g. `"insert_1"`). A `BTreeMap` keeps
    /// iteration order deterministic across runs.
    #[serde(default)]
    pub node: BTreeMap<String, NodeSpec>,
}

/// `[suite]` section: properties of the target table and the run.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteSection {
    /// Logical table name, used for catalog sync and diagnostics.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// `"copy_on_write"` or `"merge_on_read"`.
    #[serde(default)]
    pub table_type: TableType,

    /// Base path of the target table.
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Schema name used for nodes that don't override it.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Worker pool size for the executor. Must be >= 1.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// For merge-on-read tables: the engine compacts inline after this many
    /// write commits. Mirrors the engine's own delta-commit threshold.
    #[serde(default = "default_compact_after")]
    pub compact_after: usize,
}

fn default_table_name() -> String {
    "table1".to_string()
}

fn default_target_path() -> String {
    "/tmp/lakebench/table1".to_string()
}

fn default_schema() -> String {
    "source".to_string()
}

fn default_max_workers() -> usize {
    4
}

fn default_compact_after() -> usize {
    3
}

impl Default for SuiteSection {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            table_type: TableType::default(),
            target_path: default_target_path(),
            schema: default_schema(),
            max_workers: default_max_workers(),
            compact_after: default_compact_after(),
        }
    }
}

/// `[node.<name>]` section: one workload node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    /// What the node does: `generate`, `insert`, `upsert`, `sync`, `validate`.
    pub kind: NodeKind,

    /// Names of nodes that must succeed before this one runs.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Number of synthetic records to produce (generate) or write
    /// (insert/upsert without an upstream generate node).
    #[serde(default)]
    pub records: usize,

    /// Number of partitions the records are spread over.
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// Schema name for this node's records; falls back to `[suite].schema`.
    #[serde(default)]
    pub schema: Option<String>,

    /// Predicate for validate nodes, e.g. `"row_count >= 100"`.
    ///
    /// Supported metrics: `row_count`, `file_count`, `commit_count`.
    #[serde(default)]
    pub expect: Option<String>,

    /// Catalog identity for sync nodes, e.g. `"hive://testdb1"`.
    #[serde(default)]
    pub catalog: Option<String>,
}

fn default_partitions() -> usize {
    1
}

/// A workload specification that passed semantic validation.
///
/// Construct via `TryFrom<RawWorkloadFile>` or
/// [`crate::config::load_and_validate`]; the fields are then known to form a
/// resolvable, acyclic DAG with per-kind requirements satisfied.
#[derive(Debug, Clone)]
pub struct WorkloadFile {
    pub suite: SuiteSection,
    pub node: BTreeMap<String, NodeSpec>,
}

impl WorkloadFile {
    /// Internal constructor used by `validate.rs` after all checks passed.
    pub(crate) fn new_unchecked(
        suite: SuiteSection,
        node: BTreeMap<String, NodeSpec>,
    ) -> Self {
        Self { suite, node }
    }
}
