//! Row snapshots are JSON objects keyed by column name.

use serde_json::{Map, Value};

/// Column that changes on every write and never belongs in a diff
const IGNORED_COLUMN: &str = "updated_at";

/// Columns that differ between two snapshots of the same row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    pub old_values: Map<String, Value>,
    pub new_values: Map<String, Value>,
    pub changed_fields: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.changed_fields.is_empty()
    }
}

/// Compare two snapshots column by column, ignoring `updated_at`.
///
/// A column missing on one side is treated as `null`.
pub fn diff_snapshots(before: &Value, after: &Value) -> SnapshotDiff {
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut diff = SnapshotDiff::default();
    let keys = before
        .keys()
        .chain(after.keys().filter(|k| !before.contains_key(*k)));
    for key in keys {
        if key == IGNORED_COLUMN {
            continue;
        }
        let old = before.get(key).unwrap_or(&Value::Null);
        let new = after.get(key).unwrap_or(&Value::Null);
        if old != new {
            diff.old_values.insert(key.clone(), old.clone());
            diff.new_values.insert(key.clone(), new.clone());
            diff.changed_fields.push(key.clone());
        }
    }
    diff
}
