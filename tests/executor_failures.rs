// tests/executor_failures.rs

//! Failure containment: a failed node skips its transitive dependents while
//! independent branches run to completion.

use std::sync::Arc;

use lakebench::dag::{NodeStatus, WorkflowDag};
use lakebench::exec::{DagExecutor, ExecContext, ExecutorOptions};
use lakebench::store::{InMemoryTable, StorageBackend};
use lakebench_test_utils::builders::{NodeSpecBuilder, WorkloadBuilder};
use lakebench_test_utils::{init_tracing, with_timeout};

fn context(table: &Arc<InMemoryTable>) -> Arc<ExecContext> {
    let backend: Arc<dyn StorageBackend> = Arc::clone(table) as Arc<dyn StorageBackend>;
    Arc::new(ExecContext::new(backend, "/tmp/lakebench/table1", "source"))
}

/// Two independent branches sharing a root:
///
/// ```text
///        gen
///       /   \
///  bad_ins   good_ins
///     |         |
///  check_a   check_b
///     |
///  check_c
/// ```
///
/// `bad_ins` fails (schema mismatch); `check_a` and `check_c` must be
/// skipped, everything on the good branch must succeed.
#[tokio::test]
async fn failure_skips_transitive_dependents_only() {
    init_tracing();

    let workload = WorkloadBuilder::new()
        .with_node("gen", NodeSpecBuilder::generate().records(20).build())
        .with_node(
            "bad_ins",
            // Own records + bogus schema so it does not consume the staged
            // batch and fails at the engine.
            NodeSpecBuilder::insert()
                .records(10)
                .schema("bogus")
                .build(),
        )
        .with_node(
            "good_ins",
            NodeSpecBuilder::insert().depends_on("gen").build(),
        )
        .with_node(
            "check_a",
            NodeSpecBuilder::validate("commit_count >= 1")
                .depends_on("bad_ins")
                .build(),
        )
        .with_node(
            "check_b",
            NodeSpecBuilder::validate("commit_count == 1")
                .depends_on("good_ins")
                .build(),
        )
        .with_node(
            "check_c",
            NodeSpecBuilder::validate("row_count >= 1")
                .depends_on("check_a")
                .build(),
        )
        .build();

    let dag = Arc::new(WorkflowDag::from_workload(&workload).unwrap());
    let table = Arc::new(InMemoryTable::copy_on_write());
    let ctx = context(&table);

    let executor = DagExecutor::new(dag, ctx, ExecutorOptions { max_workers: 4 });
    let report = with_timeout(executor.run()).await;

    assert_eq!(report.status_of("gen"), Some(NodeStatus::Succeeded));
    assert_eq!(report.status_of("good_ins"), Some(NodeStatus::Succeeded));
    assert_eq!(report.status_of("check_b"), Some(NodeStatus::Succeeded));

    assert_eq!(report.status_of("bad_ins"), Some(NodeStatus::Failed));
    assert_eq!(report.status_of("check_a"), Some(NodeStatus::Skipped));
    assert_eq!(report.status_of("check_c"), Some(NodeStatus::Skipped));

    // Only the good insert committed.
    assert_eq!(table.write_commit_count().await, 1);
    assert!(!report.all_succeeded());
}

/// A node joining a failed branch and a successful branch must still be
/// skipped: every declared dependency has to succeed.
#[tokio::test]
async fn join_node_is_skipped_when_any_parent_fails() {
    init_tracing();

    let workload = WorkloadBuilder::new()
        .with_node("ok_ins", NodeSpecBuilder::insert().records(10).build())
        .with_node(
            "bad_ins",
            NodeSpecBuilder::insert().records(10).schema("bogus").build(),
        )
        .with_node(
            "join_upsert",
            NodeSpecBuilder::upsert()
                .records(5)
                .depends_on("ok_ins")
                .depends_on("bad_ins")
                .build(),
        )
        .build();

    let dag = Arc::new(WorkflowDag::from_workload(&workload).unwrap());
    let table = Arc::new(InMemoryTable::copy_on_write());
    let ctx = context(&table);

    let executor = DagExecutor::new(dag, ctx, ExecutorOptions { max_workers: 2 });
    let report = with_timeout(executor.run()).await;

    assert_eq!(report.status_of("ok_ins"), Some(NodeStatus::Succeeded));
    assert_eq!(report.status_of("bad_ins"), Some(NodeStatus::Failed));
    assert_eq!(report.status_of("join_upsert"), Some(NodeStatus::Skipped));
    assert_eq!(table.write_commit_count().await, 1);
}

/// The executor never aborts mid-run: even with several failures it returns
/// a report covering every node.
#[tokio::test]
async fn report_covers_every_node_after_multiple_failures() {
    init_tracing();

    let mut builder = WorkloadBuilder::new();
    for i in 0..4 {
        builder = builder.with_node(
            &format!("bad_{i}"),
            NodeSpecBuilder::insert().records(1).schema("bogus").build(),
        );
        builder = builder.with_node(
            &format!("down_{i}"),
            NodeSpecBuilder::validate("commit_count == 0")
                .depends_on(&format!("bad_{i}"))
                .build(),
        );
    }
    let workload = builder.build();

    let dag = Arc::new(WorkflowDag::from_workload(&workload).unwrap());
    let table = Arc::new(InMemoryTable::copy_on_write());
    let ctx = context(&table);

    let executor = DagExecutor::new(dag, ctx, ExecutorOptions { max_workers: 2 });
    let report = with_timeout(executor.run()).await;

    assert_eq!(report.results().count(), 8);
    assert_eq!(report.failed().count(), 4);
    assert_eq!(report.skipped().count(), 4);
}
