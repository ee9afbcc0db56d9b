#![allow(dead_code)]

use std::collections::BTreeMap;

use lakebench::config::{NodeSpec, RawWorkloadFile, SuiteSection, WorkloadFile};
use lakebench::dag::NodeKind;
use lakebench::types::TableType;

/// Builder for `WorkloadFile` to simplify test setup.
pub struct WorkloadBuilder {
    raw: RawWorkloadFile,
}

impl WorkloadBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawWorkloadFile {
                suite: SuiteSection::default(),
                node: BTreeMap::new(),
            },
        }
    }

    pub fn with_node(mut self, name: &str, spec: NodeSpec) -> Self {
        self.raw.node.insert(name.to_string(), spec);
        self
    }

    pub fn with_table_type(mut self, table_type: TableType) -> Self {
        self.raw.suite.table_type = table_type;
        self
    }

    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.raw.suite.max_workers = n;
        self
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.raw.suite.schema = schema.to_string();
        self
    }

    /// Validated workload; panics on invalid input (use `try_build` to test
    /// rejection paths).
    pub fn build(self) -> WorkloadFile {
        WorkloadFile::try_from(self.raw).expect("Failed to build valid workload from builder")
    }

    pub fn try_build(self) -> lakebench::errors::Result<WorkloadFile> {
        WorkloadFile::try_from(self.raw)
    }
}

impl Default for WorkloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `NodeSpec`.
pub struct NodeSpecBuilder {
    spec: NodeSpec,
}

impl NodeSpecBuilder {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            spec: NodeSpec {
                kind,
                depends_on: vec![],
                records: 0,
                partitions: 1,
                schema: None,
                expect: None,
                catalog: None,
            },
        }
    }

    pub fn generate() -> Self {
        Self::new(NodeKind::Generate)
    }

    pub fn insert() -> Self {
        Self::new(NodeKind::Insert)
    }

    pub fn upsert() -> Self {
        Self::new(NodeKind::Upsert)
    }

    pub fn sync() -> Self {
        Self::new(NodeKind::Sync)
    }

    pub fn validate(expect: &str) -> Self {
        Self::new(NodeKind::Validate).expect(expect)
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        self.spec.depends_on.push(dep.to_string());
        self
    }

    pub fn records(mut self, n: usize) -> Self {
        self.spec.records = n;
        self
    }

    pub fn partitions(mut self, n: usize) -> Self {
        self.spec.partitions = n;
        self
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.spec.schema = Some(schema.to_string());
        self
    }

    pub fn expect(mut self, predicate: &str) -> Self {
        self.spec.expect = Some(predicate.to_string());
        self
    }

    pub fn catalog(mut self, catalog: &str) -> Self {
        self.spec.catalog = Some(catalog.to_string());
        self
    }

    pub fn build(self) -> NodeSpec {
        self.spec
    }
}
