// src/dag/node.rs

//! Node model: capability kinds, typed configuration, validation predicates.

use std::fmt;

use serde::Deserialize;

use crate::config::model::NodeSpec;
use crate::errors::{LakebenchError, Result};
use crate::store::TableSnapshot;

/// What a workload node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Produce a batch of synthetic records; no table interaction.
    Generate,
    /// Write a batch as new rows; one write commit per successful call.
    Insert,
    /// Update matching rows, insert the rest; one write commit per call.
    Upsert,
    /// Push table metadata to an external catalog; no timeline effect.
    Sync,
    /// Evaluate a predicate over observable table state.
    Validate,
}

impl NodeKind {
    /// Write-capability nodes contribute commits to the table timeline.
    pub fn is_write(&self) -> bool {
        matches!(self, NodeKind::Insert | NodeKind::Upsert)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Generate => "generate",
            NodeKind::Insert => "insert",
            NodeKind::Upsert => "upsert",
            NodeKind::Sync => "sync",
            NodeKind::Validate => "validate",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric a validate node can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    RowCount,
    FileCount,
    CommitCount,
}

impl Metric {
    fn read(&self, snap: &TableSnapshot) -> u64 {
        match self {
            Metric::RowCount => snap.rows,
            Metric::FileCount => snap.files,
            Metric::CommitCount => snap.write_commits,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::RowCount => "row_count",
            Metric::FileCount => "file_count",
            Metric::CommitCount => "commit_count",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator in a validation predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    fn compare(&self, observed: u64, expected: u64) -> bool {
        match self {
            Cmp::Eq => observed == expected,
            Cmp::Ne => observed != expected,
            Cmp::Lt => observed < expected,
            Cmp::Le => observed <= expected,
            Cmp::Gt => observed > expected,
            Cmp::Ge => observed >= expected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cmp::Eq => "==",
            Cmp::Ne => "!=",
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Gt => ">",
            Cmp::Ge => ">=",
        }
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed validation predicate, parsed at workload-validation time from
/// expressions like `"row_count >= 100"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    pub metric: Metric,
    pub op: Cmp,
    pub value: u64,
}

impl Predicate {
    /// Parse `<metric> <op> <value>`, rejecting anything else with a
    /// configuration error so malformed workloads fail before execution.
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(LakebenchError::Config(format!(
                "invalid predicate '{input}': expected '<metric> <op> <value>'"
            )));
        }

        let metric = match parts[0] {
            "row_count" => Metric::RowCount,
            "file_count" => Metric::FileCount,
            "commit_count" => Metric::CommitCount,
            other => {
                return Err(LakebenchError::Config(format!(
                    "invalid predicate metric '{other}' \
                     (expected row_count, file_count or commit_count)"
                )));
            }
        };

        let op = match parts[1] {
            "==" => Cmp::Eq,
            "!=" => Cmp::Ne,
            "<" => Cmp::Lt,
            "<=" => Cmp::Le,
            ">" => Cmp::Gt,
            ">=" => Cmp::Ge,
            other => {
                return Err(LakebenchError::Config(format!(
                    "invalid predicate operator '{other}'"
                )));
            }
        };

        let value = parts[2].parse::<u64>().map_err(|_| {
            LakebenchError::Config(format!(
                "invalid predicate value '{}' (expected an unsigned integer)",
                parts[2]
            ))
        })?;

        Ok(Predicate { metric, op, value })
    }

    /// Evaluate against a table snapshot.
    pub fn eval(&self, snap: &TableSnapshot) -> bool {
        self.op.compare(self.metric.read(snap), self.value)
    }

    /// The observed value the predicate looked at, for failure messages.
    pub fn observed(&self, snap: &TableSnapshot) -> u64 {
        self.metric.read(snap)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.metric, self.op, self.value)
    }
}

/// Typed configuration payload of a node.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub records: usize,
    pub partitions: usize,
    pub schema: Option<String>,
    pub expect: Option<Predicate>,
    pub catalog: Option<String>,
}

/// One workload node. Immutable once the DAG is built.
#[derive(Debug, Clone)]
pub struct DagNode {
    pub name: String,
    pub kind: NodeKind,
    pub config: NodeConfig,
    /// Direct dependencies: names of nodes that must succeed first.
    pub deps: Vec<String>,
}

impl DagNode {
    /// Build a typed node from a validated workload entry.
    pub fn from_spec(name: String, spec: &NodeSpec) -> Result<Self> {
        let expect = match &spec.expect {
            Some(expr) => Some(Predicate::parse(expr)?),
            None => None,
        };

        Ok(Self {
            name,
            kind: spec.kind,
            config: NodeConfig {
                records: spec.records,
                partitions: spec.partitions.max(1),
                schema: spec.schema.clone(),
                expect,
                catalog: spec.catalog.clone(),
            },
            deps: spec.depends_on.clone(),
        })
    }
}
