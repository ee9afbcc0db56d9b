// src/exec/actions.rs

//! Node actions: one semantic unit of work per node kind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tracing::{debug, info};

use crate::dag::node::DagNode;
use crate::dag::NodeKind;
use crate::errors::{LakebenchError, Result};
use crate::store::{
    CatalogSyncRequest, Record, RecordBatch, StorageBackend, WriteRequest,
};
use crate::types::WriteMode;

/// Run-scoped context shared by all node actions.
///
/// Carries the storage backend plus a staging area where generate nodes park
/// their batches for downstream write nodes. Created once per run and dropped
/// with it; nothing here outlives the run.
pub struct ExecContext {
    pub backend: Arc<dyn StorageBackend>,
    pub target_path: String,
    pub default_schema: String,
    staged: Mutex<HashMap<String, RecordBatch>>,
}

impl ExecContext {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        target_path: impl Into<String>,
        default_schema: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            target_path: target_path.into(),
            default_schema: default_schema.into(),
            staged: Mutex::new(HashMap::new()),
        }
    }

    fn stage(&self, name: &str, batch: RecordBatch) {
        if let Ok(mut staged) = self.staged.lock() {
            staged.insert(name.to_string(), batch);
        }
    }

    /// Batch staged by `name`, if that node was a generate node that ran.
    /// Cloned so several write branches can consume the same input.
    fn staged_batch(&self, name: &str) -> Option<RecordBatch> {
        self.staged.lock().ok().and_then(|s| s.get(name).cloned())
    }
}

/// Execute one node's action to completion.
///
/// The worker task awaits this; from the scheduler's perspective the action
/// is synchronous even when the backend is internally asynchronous. Every
/// failure is returned as an [`LakebenchError::Execution`] carrying the node
/// name, never propagated out of the run.
pub async fn run_node(node: &DagNode, ctx: &ExecContext) -> Result<()> {
    match node.kind {
        NodeKind::Generate => run_generate(node, ctx),
        NodeKind::Insert => run_write(node, ctx, WriteMode::Insert).await,
        NodeKind::Upsert => run_write(node, ctx, WriteMode::Upsert).await,
        NodeKind::Sync => run_sync(node, ctx).await,
        NodeKind::Validate => run_validate(node, ctx).await,
    }
}

fn run_generate(node: &DagNode, ctx: &ExecContext) -> Result<()> {
    let batch = synthesize_batch(node, ctx);
    info!(
        node = %node.name,
        records = batch.len(),
        schema = %batch.schema,
        "generated synthetic batch"
    );
    ctx.stage(&node.name, batch);
    Ok(())
}

async fn run_write(node: &DagNode, ctx: &ExecContext, mode: WriteMode) -> Result<()> {
    // Prefer a batch staged by a direct generate dependency; otherwise the
    // write node synthesizes its own input from its config.
    let batch = node
        .deps
        .iter()
        .find_map(|dep| ctx.staged_batch(dep))
        .unwrap_or_else(|| synthesize_batch(node, ctx));

    if batch.is_empty() {
        return Err(execution_error(node, "no input batch to write"));
    }

    debug!(node = %node.name, mode = %mode, rows = batch.len(), "submitting write");

    let commit = ctx
        .backend
        .write_batch(WriteRequest { mode, batch })
        .await
        .map_err(|e| execution_error(node, &e.to_string()))?;

    info!(node = %node.name, commit = %commit, mode = %mode, "write accepted");
    Ok(())
}

async fn run_sync(node: &DagNode, ctx: &ExecContext) -> Result<()> {
    let catalog = node
        .config
        .catalog
        .clone()
        .unwrap_or_else(|| "hive://default".to_string());

    ctx.backend
        .sync_catalog(CatalogSyncRequest {
            table_path: ctx.target_path.clone(),
            catalog: catalog.clone(),
        })
        .await
        .map_err(|e| execution_error(node, &e.to_string()))?;

    info!(node = %node.name, catalog = %catalog, "catalog metadata synced");
    Ok(())
}

async fn run_validate(node: &DagNode, ctx: &ExecContext) -> Result<()> {
    let predicate = node
        .config
        .expect
        .ok_or_else(|| execution_error(node, "validate node has no predicate"))?;

    let snap = ctx
        .backend
        .snapshot()
        .await
        .map_err(|e| execution_error(node, &e.to_string()))?;

    if !predicate.eval(&snap) {
        return Err(execution_error(
            node,
            &format!(
                "predicate '{}' not satisfied ({} = {})",
                predicate,
                predicate.metric,
                predicate.observed(&snap)
            ),
        ));
    }

    info!(node = %node.name, predicate = %predicate, "validation predicate satisfied");
    Ok(())
}

/// Produce `records` synthetic rows spread over the configured partitions.
fn synthesize_batch(node: &DagNode, ctx: &ExecContext) -> RecordBatch {
    let schema = node
        .config
        .schema
        .clone()
        .unwrap_or_else(|| ctx.default_schema.clone());
    let partitions = node.config.partitions.max(1);

    let mut rng = rand::thread_rng();
    let rows = (0..node.config.records)
        .map(|i| Record {
            key: format!("{}-{:08}", node.name, i),
            partition: format!("p{}", i % partitions),
            payload: rng.r#gen(),
        })
        .collect();

    RecordBatch { schema, rows }
}

fn execution_error(node: &DagNode, reason: &str) -> LakebenchError {
    LakebenchError::Execution {
        node: node.name.clone(),
        reason: reason.to_string(),
    }
}
