// tests/generator_determinism.rs

//! Programmatic generators must be resolvable by name and produce the same
//! topology on every call for the same suite configuration.

use std::sync::Arc;

use lakebench::config::SuiteSection;
use lakebench::dag::WorkflowDag;
use lakebench::exec::{ExecContext, ExecutorOptions};
use lakebench::generators::{generator_by_name, generator_names};
use lakebench::store::{InMemoryTable, StorageBackend};
use lakebench::suite::run_suite;
use lakebench_test_utils::{init_tracing, with_timeout};

fn fingerprint(dag: &WorkflowDag) -> Vec<(String, String, Vec<String>)> {
    dag.nodes()
        .map(|n| {
            (
                n.name.clone(),
                n.kind.as_str().to_string(),
                n.deps.clone(),
            )
        })
        .collect()
}

#[test]
fn registry_resolves_every_registered_name() {
    for name in generator_names() {
        let generator = generator_by_name(name)
            .unwrap_or_else(|| panic!("generator '{name}' missing from registry"));
        assert_eq!(generator.name(), *name);
    }
}

#[test]
fn unknown_generator_name_resolves_to_none() {
    assert!(generator_by_name("no-such-generator").is_none());
}

#[test]
fn generators_produce_identical_dags_on_repeated_calls() {
    let suite = SuiteSection::default();
    for name in generator_names() {
        let generator = generator_by_name(name).unwrap();
        let first = generator.generate(&suite).unwrap();
        let second = generator.generate(&suite).unwrap();
        assert_eq!(
            fingerprint(&first),
            fingerprint(&second),
            "generator '{name}' is not deterministic"
        );
    }
}

#[test]
fn generated_dags_pass_structural_checks() {
    let suite = SuiteSection::default();
    for name in generator_names() {
        let dag = generator_by_name(name).unwrap().generate(&suite).unwrap();
        assert!(!dag.is_empty(), "generator '{name}' produced an empty DAG");
        for node in dag.nodes() {
            for dep in node.deps.iter() {
                assert!(dag.get(dep).is_some());
            }
        }
    }
}

fn context(table: &Arc<InMemoryTable>) -> Arc<ExecContext> {
    let backend: Arc<dyn StorageBackend> = Arc::clone(table) as Arc<dyn StorageBackend>;
    Arc::new(ExecContext::new(backend, "/tmp/lakebench/table1", "source"))
}

#[tokio::test]
async fn insert_upsert_validate_generator_runs_to_success() {
    init_tracing();

    let suite = SuiteSection::default();
    let dag = generator_by_name("insert-upsert-validate")
        .unwrap()
        .generate(&suite)
        .unwrap();

    let table = Arc::new(InMemoryTable::copy_on_write());
    let ctx = context(&table);
    let options = ExecutorOptions {
        max_workers: suite.max_workers,
    };

    let suite_report = with_timeout(run_suite(Arc::new(dag), ctx, options))
        .await
        .unwrap();

    assert!(suite_report.outcome.is_success(), "{:?}", suite_report.outcome);
    assert_eq!(table.write_commit_count().await, 2);
}

#[tokio::test]
async fn wide_branches_generator_runs_to_success() {
    init_tracing();

    let suite = SuiteSection::default();
    let dag = generator_by_name("wide-branches")
        .unwrap()
        .generate(&suite)
        .unwrap();

    let table = Arc::new(InMemoryTable::copy_on_write());
    let ctx = context(&table);
    let options = ExecutorOptions {
        max_workers: suite.max_workers,
    };

    let suite_report = with_timeout(run_suite(Arc::new(dag), ctx, options))
        .await
        .unwrap();

    // Two inserts fed by the generate node plus one upsert: three commits,
    // and the catalog was synced.
    assert!(suite_report.outcome.is_success(), "{:?}", suite_report.outcome);
    assert_eq!(table.write_commit_count().await, 3);
    assert_eq!(
        table.synced_catalogs().await,
        vec!["hive://testdb1".to_string()]
    );
}
