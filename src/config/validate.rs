// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{NodeSpec, RawWorkloadFile, WorkloadFile};
use crate::dag::node::{NodeKind, Predicate};
use crate::errors::{LakebenchError, Result};

impl TryFrom<RawWorkloadFile> for WorkloadFile {
    type Error = LakebenchError;

    fn try_from(raw: RawWorkloadFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_workload(&raw)?;
        Ok(WorkloadFile::new_unchecked(raw.suite, raw.node))
    }
}

fn validate_raw_workload(raw: &RawWorkloadFile) -> Result<()> {
    ensure_has_nodes(raw)?;
    validate_suite(raw)?;
    validate_node_dependencies(raw)?;
    validate_node_fields(raw)?;
    validate_dag(raw)?;
    Ok(())
}

fn ensure_has_nodes(raw: &RawWorkloadFile) -> Result<()> {
    if raw.node.is_empty() {
        return Err(LakebenchError::Config(
            "workload must contain at least one [node.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_suite(raw: &RawWorkloadFile) -> Result<()> {
    if raw.suite.max_workers == 0 {
        return Err(LakebenchError::Config(
            "[suite].max_workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_node_dependencies(raw: &RawWorkloadFile) -> Result<()> {
    for (name, spec) in raw.node.iter() {
        for dep in spec.depends_on.iter() {
            if !raw.node.contains_key(dep) {
                return Err(LakebenchError::Config(format!(
                    "node '{}' has unknown dependency '{}' in `depends_on`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(LakebenchError::Config(format!(
                    "node '{}' cannot depend on itself in `depends_on`",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_node_fields(raw: &RawWorkloadFile) -> Result<()> {
    for (name, spec) in raw.node.iter() {
        match spec.kind {
            NodeKind::Generate => {
                if spec.records == 0 {
                    return Err(LakebenchError::Config(format!(
                        "generate node '{}' must set `records` >= 1",
                        name
                    )));
                }
            }
            NodeKind::Insert | NodeKind::Upsert => {
                if spec.records == 0 && !has_generate_dependency(spec, raw) {
                    return Err(LakebenchError::Config(format!(
                        "write node '{}' needs `records` >= 1 or a generate node in `depends_on`",
                        name
                    )));
                }
            }
            NodeKind::Validate => match &spec.expect {
                Some(expr) => {
                    Predicate::parse(expr).map_err(|e| {
                        LakebenchError::Config(format!("node '{}': {}", name, e))
                    })?;
                }
                None => {
                    return Err(LakebenchError::Config(format!(
                        "validate node '{}' must set `expect`",
                        name
                    )));
                }
            },
            NodeKind::Sync => {}
        }
    }
    Ok(())
}

fn has_generate_dependency(spec: &NodeSpec, raw: &RawWorkloadFile) -> bool {
    spec.depends_on.iter().any(|dep| {
        raw.node
            .get(dep)
            .map(|d| d.kind == NodeKind::Generate)
            .unwrap_or(false)
    })
}

fn validate_dag(raw: &RawWorkloadFile) -> Result<()> {
    // Build a petgraph graph from the nodes and their dependencies.
    //
    // Edge direction: dep -> node
    // For:
    //   [node.B]
    //   depends_on = ["A"]
    // we add edge A -> B.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in raw.node.keys() {
        graph.add_node(name.as_str());
    }

    for (name, spec) in raw.node.iter() {
        for dep in spec.depends_on.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(LakebenchError::DagCycle(format!(
                "cycle detected in workload DAG involving node '{}'",
                node
            )))
        }
    }
}
