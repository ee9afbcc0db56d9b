// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// Write strategy of the target table.
///
/// - `CopyOnWrite`: every write rewrites affected files; the timeline carries
///   only write commits.
/// - `MergeOnRead`: writes land as deltas and the engine schedules its own
///   compaction instants in the background. Each accepted write still
///   registers exactly one write commit; compaction is an engine-internal
///   concern the harness observes but never counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    CopyOnWrite,
    MergeOnRead,
}

impl Default for TableType {
    fn default() -> Self {
        TableType::CopyOnWrite
    }
}

impl FromStr for TableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy_on_write" | "cow" => Ok(TableType::CopyOnWrite),
            "merge_on_read" | "mor" => Ok(TableType::MergeOnRead),
            other => Err(format!(
                "invalid table_type: {other} (expected \"copy_on_write\" or \"merge_on_read\")"
            )),
        }
    }
}

/// How a batch of records is applied to the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Append the batch as new rows.
    Insert,
    /// Update rows with matching keys, insert the rest.
    Upsert,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Insert => write!(f, "insert"),
            WriteMode::Upsert => write!(f, "upsert"),
        }
    }
}
