// tests/cancel_behaviour.rs

//! Cooperative stop: once the signal is raised, nothing new starts, running
//! nodes finish normally, and the rest of the DAG ends Skipped.

use std::sync::Arc;
use std::time::Duration;

use lakebench::dag::{NodeStatus, WorkflowDag};
use lakebench::exec::{DagExecutor, ExecContext, ExecutorOptions};
use lakebench::store::{InMemoryTable, StorageBackend, TableOptions};
use lakebench::types::TableType;
use lakebench_test_utils::builders::{NodeSpecBuilder, WorkloadBuilder};
use lakebench_test_utils::{init_tracing, with_timeout};

fn slow_table(write_delay: Duration) -> Arc<InMemoryTable> {
    Arc::new(InMemoryTable::new(TableOptions {
        table_type: TableType::CopyOnWrite,
        schema: "source".to_string(),
        compact_after: 3,
        write_delay: Some(write_delay),
    }))
}

#[tokio::test]
async fn stop_lets_running_node_finish_and_skips_the_rest() {
    init_tracing();

    // Chain of three writes; each write takes ~200ms.
    let workload = WorkloadBuilder::new()
        .with_node("w1", NodeSpecBuilder::insert().records(1).build())
        .with_node(
            "w2",
            NodeSpecBuilder::insert().records(1).depends_on("w1").build(),
        )
        .with_node(
            "w3",
            NodeSpecBuilder::insert().records(1).depends_on("w2").build(),
        )
        .build();

    let dag = Arc::new(WorkflowDag::from_workload(&workload).unwrap());
    let table = slow_table(Duration::from_millis(200));
    let backend: Arc<dyn StorageBackend> = Arc::clone(&table) as Arc<dyn StorageBackend>;
    let ctx = Arc::new(ExecContext::new(backend, "/tmp/lakebench/table1", "source"));

    let executor = DagExecutor::new(dag, ctx, ExecutorOptions { max_workers: 1 });
    let stop = executor.stop_signal();

    // Raise the stop while w1 is still writing.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.raise();
    });

    let report = with_timeout(executor.run()).await;

    // w1 was already running: it finishes and commits.
    assert_eq!(report.status_of("w1"), Some(NodeStatus::Succeeded));
    // Nothing after the signal ever starts.
    assert_eq!(report.status_of("w2"), Some(NodeStatus::Skipped));
    assert_eq!(report.status_of("w3"), Some(NodeStatus::Skipped));

    assert_eq!(table.write_commit_count().await, 1);
}

#[tokio::test]
async fn stop_before_run_skips_everything() {
    init_tracing();

    let workload = WorkloadBuilder::new()
        .with_node("w1", NodeSpecBuilder::insert().records(1).build())
        .with_node(
            "check",
            NodeSpecBuilder::validate("commit_count == 1")
                .depends_on("w1")
                .build(),
        )
        .build();

    let dag = Arc::new(WorkflowDag::from_workload(&workload).unwrap());
    let table = Arc::new(InMemoryTable::copy_on_write());
    let backend: Arc<dyn StorageBackend> = Arc::clone(&table) as Arc<dyn StorageBackend>;
    let ctx = Arc::new(ExecContext::new(backend, "/tmp/lakebench/table1", "source"));

    let executor = DagExecutor::new(dag, ctx, ExecutorOptions { max_workers: 2 });
    executor.stop_signal().raise();

    let report = with_timeout(executor.run()).await;

    assert_eq!(report.status_of("w1"), Some(NodeStatus::Skipped));
    assert_eq!(report.status_of("check"), Some(NodeStatus::Skipped));
    assert_eq!(table.write_commit_count().await, 0);
}
