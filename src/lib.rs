// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod generators;
pub mod logging;
pub mod store;
pub mod suite;
pub mod types;
pub mod validator;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::SuiteSection;
use crate::dag::WorkflowDag;
use crate::exec::{ExecContext, ExecutorOptions};
use crate::generators::{generator_by_name, generator_names};
use crate::store::{InMemoryTable, StorageBackend, TableOptions};
use crate::suite::{run_suite, SuiteOutcome};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - workload loading (TOML document or named generator variant)
/// - the in-memory reference engine built from `[suite]`
/// - the executor and the post-run timeline validator
pub async fn run(args: CliArgs) -> Result<()> {
    let (suite, dag) = build_workload(&args)?;

    if args.dry_run {
        print_dry_run(&suite, &dag);
        return Ok(());
    }

    let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryTable::new(TableOptions {
        table_type: suite.table_type,
        schema: suite.schema.clone(),
        compact_after: suite.compact_after,
        write_delay: None,
    }));

    let ctx = Arc::new(ExecContext::new(
        Arc::clone(&backend),
        suite.target_path.clone(),
        suite.schema.clone(),
    ));

    let options = ExecutorOptions {
        max_workers: args.workers.unwrap_or(suite.max_workers).max(1),
    };

    info!(
        table = %suite.table_name,
        table_type = ?suite.table_type,
        nodes = dag.len(),
        max_workers = options.max_workers,
        "starting suite run"
    );

    let suite_report = run_suite(Arc::new(dag), ctx, options).await?;

    for result in suite_report.report.results() {
        debug!(
            node = %result.name,
            status = ?result.status,
            duration = ?result.duration(),
            "node outcome"
        );
    }

    match suite_report.outcome {
        SuiteOutcome::Success => Ok(()),
        SuiteOutcome::Failure(failures) => {
            for f in &failures {
                eprintln!("  {} [{:?}]: {}", f.node, f.status, f.reason);
            }
            Err(anyhow!("{} node(s) failed or were skipped", failures.len()))
        }
        SuiteOutcome::ValidationFailure { expected, observed } => Err(anyhow!(
            "timeline validation failed: expected {expected} new write commits, observed {observed}"
        )),
    }
}

/// Resolve the workload: a named generator variant wins over the file path.
fn build_workload(args: &CliArgs) -> Result<(SuiteSection, WorkflowDag)> {
    if let Some(name) = &args.generator {
        let generator = generator_by_name(name).ok_or_else(|| {
            anyhow!(
                "unknown generator '{}' (known: {})",
                name,
                generator_names().join(", ")
            )
        })?;
        let suite = SuiteSection::default();
        let dag = generator.generate(&suite)?;
        return Ok((suite, dag));
    }

    let workload = load_and_validate(&args.workload)?;
    let dag = WorkflowDag::from_workload(&workload)?;
    Ok((workload.suite, dag))
}

/// Simple dry-run output: print the suite settings and the DAG plan.
fn print_dry_run(suite: &SuiteSection, dag: &WorkflowDag) {
    println!("lakebench dry-run");
    println!("  suite.table_name = {}", suite.table_name);
    println!("  suite.table_type = {:?}", suite.table_type);
    println!("  suite.target_path = {}", suite.target_path);
    println!("  suite.max_workers = {}", suite.max_workers);
    println!();

    println!("nodes ({}):", dag.len());
    for node in dag.nodes() {
        println!("  - {} ({})", node.name, node.kind);
        if !node.deps.is_empty() {
            println!("      depends_on: {:?}", node.deps);
        }
        if node.config.records > 0 {
            println!(
                "      records: {} across {} partition(s)",
                node.config.records, node.config.partitions
            );
        }
        if let Some(ref predicate) = node.config.expect {
            println!("      expect: {predicate}");
        }
        if let Some(ref catalog) = node.config.catalog {
            println!("      catalog: {catalog}");
        }
    }

    println!();
    println!(
        "write nodes: {} (expected new commits when all succeed)",
        dag.write_node_count()
    );

    debug!("dry-run complete (no execution)");
}
