// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::config::model::WorkloadFile;
use crate::dag::node::DagNode;
use crate::errors::{LakebenchError, Result};

/// Immutable workload DAG keyed by node name.
///
/// Holds the typed nodes plus derived adjacency in both directions. Every
/// constructor re-checks structural invariants (unique names, resolvable
/// dependencies, acyclicity) so programmatic generators get the same
/// guarantees as TOML workloads.
#[derive(Debug, Clone)]
pub struct WorkflowDag {
    nodes: BTreeMap<String, DagNode>,
    dependents: HashMap<String, Vec<String>>,
}

impl WorkflowDag {
    /// Build a DAG from a validated [`WorkloadFile`].
    pub fn from_workload(workload: &WorkloadFile) -> Result<Self> {
        let mut nodes = Vec::with_capacity(workload.node.len());
        for (name, spec) in workload.node.iter() {
            nodes.push(DagNode::from_spec(name.clone(), spec)?);
        }
        Self::from_nodes(nodes)
    }

    /// Build a DAG from programmatically constructed nodes.
    ///
    /// Rejects duplicate names, unresolved or self-referential dependencies,
    /// and cycles, all as configuration errors.
    pub fn from_nodes(node_list: Vec<DagNode>) -> Result<Self> {
        let mut nodes: BTreeMap<String, DagNode> = BTreeMap::new();
        for node in node_list {
            if nodes.contains_key(&node.name) {
                return Err(LakebenchError::Config(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
            nodes.insert(node.name.clone(), node);
        }

        if nodes.is_empty() {
            return Err(LakebenchError::Config(
                "workload DAG must contain at least one node".to_string(),
            ));
        }

        for (name, node) in nodes.iter() {
            for dep in node.deps.iter() {
                if dep == name {
                    return Err(LakebenchError::Config(format!(
                        "node '{}' cannot depend on itself",
                        name
                    )));
                }
                if !nodes.contains_key(dep) {
                    return Err(LakebenchError::Config(format!(
                        "node '{}' has unknown dependency '{}'",
                        name, dep
                    )));
                }
            }
        }

        // Dependents: second pass over the dependency lists.
        let mut dependents: HashMap<String, Vec<String>> =
            nodes.keys().map(|n| (n.clone(), Vec::new())).collect();
        for (name, node) in nodes.iter() {
            for dep in node.deps.iter() {
                if let Some(list) = dependents.get_mut(dep) {
                    list.push(name.clone());
                }
            }
        }

        let dag = Self { nodes, dependents };
        dag.check_acyclic()?;
        Ok(dag)
    }

    /// Kahn's algorithm: if the peeling doesn't consume every node, the
    /// leftovers sit on a cycle.
    fn check_acyclic(&self) -> Result<()> {
        let mut indegree: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|(name, node)| (name.as_str(), node.deps.len()))
            .collect();

        let mut queue: VecDeque<&str> = indegree
            .iter()
            .filter(|&(_, &d)| d == 0)
            .map(|(&name, _)| name)
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(name) = queue.pop_front() {
            visited.insert(name);
            for dependent in self.dependents_of(name) {
                if let Some(d) = indegree.get_mut(dependent.as_str()) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        if visited.len() != self.nodes.len() {
            // Name one offender so the error is actionable.
            let offender = self
                .nodes
                .keys()
                .find(|name| !visited.contains(name.as_str()))
                .cloned()
                .unwrap_or_default();
            return Err(LakebenchError::DagCycle(format!(
                "cycle detected in workload DAG involving node '{}'",
                offender
            )));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node names, in deterministic (sorted) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&DagNode> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DagNode> {
        self.nodes.values()
    }

    /// Immediate dependencies of a node.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a node (nodes listing it in `depends_on`).
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.dependents
            .get(name)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Number of write-capability nodes in the DAG.
    pub fn write_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.kind.is_write()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::node::{NodeConfig, NodeKind};

    fn node(name: &str, deps: &[&str]) -> DagNode {
        DagNode {
            name: name.to_string(),
            kind: NodeKind::Insert,
            config: NodeConfig {
                records: 1,
                partitions: 1,
                ..NodeConfig::default()
            },
            deps: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn acyclic_chain_with_a_root_is_accepted() {
        let dag = WorkflowDag::from_nodes(vec![
            node("a", &[]),
            node("b", &["a"]),
            node("c", &["b"]),
        ])
        .unwrap();
        assert_eq!(dag.len(), 3);
        assert_eq!(dag.dependents_of("a"), &["b".to_string()]);
    }

    #[test]
    fn cycle_is_rejected_even_with_an_unrelated_root() {
        // "root" has indegree zero, so the peel starts; "x" and "y" sit on a
        // cycle and must be left over.
        let err = WorkflowDag::from_nodes(vec![
            node("root", &[]),
            node("x", &["y"]),
            node("y", &["x"]),
        ])
        .unwrap_err();
        match err {
            LakebenchError::DagCycle(msg) => {
                assert!(msg.contains("x") || msg.contains("y"));
            }
            other => panic!("expected DagCycle, got: {other:?}"),
        }
    }

    #[test]
    fn duplicate_node_name_is_rejected() {
        let err =
            WorkflowDag::from_nodes(vec![node("a", &[]), node("a", &[])]).unwrap_err();
        assert!(matches!(err, LakebenchError::Config(_)));
    }
}
