//! Snapshot listing payloads.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// One entry of `restic snapshots --json`.
///
/// Only `id` is required; the remaining fields are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full snapshot identifier.
    pub id: CompactString,
    /// Abbreviated identifier, when the engine provides one.
    #[serde(default)]
    pub short_id: Option<CompactString>,
    /// Creation time as reported by the engine.
    #[serde(default)]
    pub time: Option<String>,
    /// Host the snapshot was taken on.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Backed-up paths.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Tags attached to the snapshot.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Snapshot {
    /// Snapshot with just an id.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            short_id: None,
            time: None,
            hostname: None,
            paths: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// Parse a snapshot listing, keeping the engine's order.
///
/// Invalid JSON and well-formed JSON of the wrong shape are reported as
/// distinct errors.
pub fn parse_snapshots(payload: &[u8]) -> Result<Vec<Snapshot>, EngineError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|source| EngineError::SnapshotsUnparseable { source })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EngineError::UnexpectedSnapshotShape {
                detail: format!("expected a list, found {}", kind_of(&other)),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| EngineError::UnexpectedSnapshotShape {
                detail: format!("entry {index}: {err}"),
            })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
