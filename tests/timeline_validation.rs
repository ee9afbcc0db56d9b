// tests/timeline_validation.rs

//! The post-run check is exact: write commits the executed nodes don't
//! account for fail the run, even when every node succeeded.

use std::sync::Arc;

use lakebench::dag::WorkflowDag;
use lakebench::errors::LakebenchError;
use lakebench::exec::{DagExecutor, ExecContext, ExecutorOptions};
use lakebench::store::{
    BoxFuture, CatalogSyncRequest, CommitId, CommitRecord, InMemoryTable, StorageBackend,
    TableSnapshot, WriteRequest,
};
use lakebench::suite::{run_suite, SuiteOutcome};
use lakebench::validator::TimelineValidator;
use lakebench_test_utils::builders::{NodeSpecBuilder, WorkloadBuilder};
use lakebench_test_utils::{init_tracing, with_timeout};

fn sync_only_dag() -> Arc<WorkflowDag> {
    let workload = WorkloadBuilder::new()
        .with_node(
            "sync_catalog",
            NodeSpecBuilder::sync().catalog("hive://testdb1").build(),
        )
        .build();
    Arc::new(WorkflowDag::from_workload(&workload).unwrap())
}

#[tokio::test]
async fn commit_appearing_after_the_baseline_fails_validation() {
    init_tracing();

    let table = Arc::new(InMemoryTable::copy_on_write());
    let backend: Arc<dyn StorageBackend> = Arc::clone(&table) as Arc<dyn StorageBackend>;

    let validator = TimelineValidator::capture(&backend).await.unwrap();
    assert_eq!(validator.baseline(), 0);

    // A commit lands behind the harness's back after the baseline snapshot.
    table.seed_commit(5).await;

    let dag = sync_only_dag();
    let ctx = Arc::new(ExecContext::new(
        Arc::clone(&backend),
        "/tmp/lakebench/table1",
        "source",
    ));
    let executor = DagExecutor::new(Arc::clone(&dag), ctx, ExecutorOptions { max_workers: 1 });
    let report = with_timeout(executor.run()).await;
    assert!(report.all_succeeded());

    // No write node succeeded, yet the timeline grew by one.
    let err = validator.check(&dag, &report, &backend).await.unwrap_err();
    match err {
        LakebenchError::Validation { expected, observed } => {
            assert_eq!(expected, 0);
            assert_eq!(observed, 1);
        }
        other => panic!("expected Validation error, got: {other:?}"),
    }
}

/// A backend that commits an extra instant while handling a catalog sync,
/// modelling an engine doing unaccounted writes under the harness.
struct CommitLeakingBackend {
    inner: Arc<InMemoryTable>,
}

impl StorageBackend for CommitLeakingBackend {
    fn write_batch(&self, req: WriteRequest) -> BoxFuture<'_, lakebench::errors::Result<CommitId>> {
        self.inner.write_batch(req)
    }

    fn timeline(&self) -> BoxFuture<'_, lakebench::errors::Result<Vec<CommitRecord>>> {
        self.inner.timeline()
    }

    fn sync_catalog(
        &self,
        req: CatalogSyncRequest,
    ) -> BoxFuture<'_, lakebench::errors::Result<()>> {
        Box::pin(async move {
            self.inner.sync_catalog(req).await?;
            self.inner.seed_commit(1).await;
            Ok(())
        })
    }

    fn snapshot(&self) -> BoxFuture<'_, lakebench::errors::Result<TableSnapshot>> {
        self.inner.snapshot()
    }
}

#[tokio::test]
async fn unaccounted_commit_yields_validation_failure_outcome() {
    init_tracing();

    let backend: Arc<dyn StorageBackend> = Arc::new(CommitLeakingBackend {
        inner: Arc::new(InMemoryTable::copy_on_write()),
    });
    let ctx = Arc::new(ExecContext::new(
        backend,
        "/tmp/lakebench/table1",
        "source",
    ));

    let suite_report = with_timeout(run_suite(
        sync_only_dag(),
        ctx,
        ExecutorOptions { max_workers: 1 },
    ))
    .await
    .unwrap();

    // Every node succeeded, so the mismatch surfaces as its own outcome.
    assert!(suite_report.report.all_succeeded());
    match suite_report.outcome {
        SuiteOutcome::ValidationFailure { expected, observed } => {
            assert_eq!(expected, 0);
            assert_eq!(observed, 1);
        }
        other => panic!("expected ValidationFailure outcome, got: {other:?}"),
    }
}
