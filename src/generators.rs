// src/generators.rs

//! Built-in programmatic DAG generators.
//!
//! Each generator produces a fixed, code-defined topology from a base suite
//! configuration. Variants are resolved through a static name registry at
//! DAG-build time, so new generators are a match arm away and nothing is
//! loaded by class name at runtime.

use crate::config::model::SuiteSection;
use crate::dag::node::{DagNode, NodeConfig, NodeKind, Predicate};
use crate::dag::WorkflowDag;
use crate::errors::Result;

/// A named, code-defined workload topology.
pub trait DagGenerator {
    fn name(&self) -> &'static str;

    /// Produce a checked [`WorkflowDag`] for the given suite configuration.
    fn generate(&self, suite: &SuiteSection) -> Result<WorkflowDag>;
}

/// Resolve a generator variant by name.
pub fn generator_by_name(name: &str) -> Option<Box<dyn DagGenerator>> {
    match name {
        "insert-upsert-validate" => Some(Box::new(InsertUpsertValidate)),
        "wide-branches" => Some(Box::new(WideBranches)),
        "catalog-sync" => Some(Box::new(CatalogSyncOnly)),
        _ => None,
    }
}

/// Names of all registered generator variants.
pub fn generator_names() -> &'static [&'static str] {
    &["insert-upsert-validate", "wide-branches", "catalog-sync"]
}

fn node(name: &str, kind: NodeKind, config: NodeConfig, deps: &[&str]) -> DagNode {
    DagNode {
        name: name.to_string(),
        kind,
        config,
        deps: deps.iter().map(|d| d.to_string()).collect(),
    }
}

fn write_config(records: usize, partitions: usize, schema: &str) -> NodeConfig {
    NodeConfig {
        records,
        partitions,
        schema: Some(schema.to_string()),
        ..NodeConfig::default()
    }
}

/// A simple insert → upsert → validate chain: two write commits, then a
/// row-count check.
pub struct InsertUpsertValidate;

impl DagGenerator for InsertUpsertValidate {
    fn name(&self) -> &'static str {
        "insert-upsert-validate"
    }

    fn generate(&self, suite: &SuiteSection) -> Result<WorkflowDag> {
        let schema = suite.schema.as_str();
        WorkflowDag::from_nodes(vec![
            node(
                "insert_1",
                NodeKind::Insert,
                write_config(100, 2, schema),
                &[],
            ),
            node(
                "upsert_1",
                NodeKind::Upsert,
                write_config(50, 2, schema),
                &["insert_1"],
            ),
            node(
                "validate_rows",
                NodeKind::Validate,
                NodeConfig {
                    expect: Some(Predicate::parse("commit_count == 2")?),
                    ..NodeConfig::default()
                },
                &["upsert_1"],
            ),
        ])
    }
}

/// One generate node fanning out to parallel insert branches, joined by an
/// upsert, a final validation and a catalog sync.
pub struct WideBranches;

impl DagGenerator for WideBranches {
    fn name(&self) -> &'static str {
        "wide-branches"
    }

    fn generate(&self, suite: &SuiteSection) -> Result<WorkflowDag> {
        let schema = suite.schema.as_str();
        WorkflowDag::from_nodes(vec![
            node(
                "gen_input",
                NodeKind::Generate,
                write_config(200, 4, schema),
                &[],
            ),
            node(
                "insert_left",
                NodeKind::Insert,
                write_config(0, 1, schema),
                &["gen_input"],
            ),
            node(
                "insert_right",
                NodeKind::Insert,
                write_config(0, 1, schema),
                &["gen_input"],
            ),
            node(
                "upsert_merge",
                NodeKind::Upsert,
                write_config(80, 4, schema),
                &["insert_left", "insert_right"],
            ),
            node(
                "validate_commits",
                NodeKind::Validate,
                NodeConfig {
                    expect: Some(Predicate::parse("commit_count == 3")?),
                    ..NodeConfig::default()
                },
                &["upsert_merge"],
            ),
            node(
                "sync_catalog",
                NodeKind::Sync,
                NodeConfig {
                    catalog: Some("hive://testdb1".to_string()),
                    ..NodeConfig::default()
                },
                &["upsert_merge"],
            ),
        ])
    }
}

/// A catalog-sync-only graph: publishes metadata for a table whose commits
/// were created by earlier setup, contributing no commits of its own.
pub struct CatalogSyncOnly;

impl DagGenerator for CatalogSyncOnly {
    fn name(&self) -> &'static str {
        "catalog-sync"
    }

    fn generate(&self, _suite: &SuiteSection) -> Result<WorkflowDag> {
        WorkflowDag::from_nodes(vec![node(
            "sync_catalog",
            NodeKind::Sync,
            NodeConfig {
                catalog: Some("hive://testdb1".to_string()),
                ..NodeConfig::default()
            },
            &[],
        )])
    }
}
