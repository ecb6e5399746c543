//! AuditLog entity - append-only record of one data mutation

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::audit::{AuditTable, SnapshotDiff};
use crate::value_objects::text_enum;

text_enum! {
    /// Kind of mutation an audit entry records
    pub enum AuditOperation {
        Create => "CREATE",
        Update => "UPDATE",
        Delete => "DELETE",
        Rollback => "ROLLBACK",
    }
}

/// A stored audit entry
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    pub id: i64,
    pub table_name: String,
    pub record_id: i64,
    pub operation: AuditOperation,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub changed_fields: Vec<String>,
    pub user_id: Option<i64>,
    pub reason: Option<String>,
    pub rollback_of: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// An audit entry about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub table: AuditTable,
    pub record_id: i64,
    pub operation: AuditOperation,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub changed_fields: Vec<String>,
    pub user_id: i64,
    pub reason: Option<String>,
    pub rollback_of: Option<i64>,
}

impl NewAuditLog {
    /// Record an insert: the full new row
    pub fn created(table: AuditTable, record_id: i64, row: Value, user_id: i64) -> Self {
        Self {
            table,
            record_id,
            operation: AuditOperation::Create,
            changed_fields: object_keys(&row),
            old_values: None,
            new_values: Some(row),
            user_id,
            reason: None,
            rollback_of: None,
        }
    }

    /// Record an update: only the changed columns
    pub fn updated(table: AuditTable, record_id: i64, diff: SnapshotDiff, user_id: i64) -> Self {
        Self {
            table,
            record_id,
            operation: AuditOperation::Update,
            old_values: Some(Value::Object(diff.old_values)),
            new_values: Some(Value::Object(diff.new_values)),
            changed_fields: diff.changed_fields,
            user_id,
            reason: None,
            rollback_of: None,
        }
    }

    /// Record a delete: the full old row
    pub fn deleted(table: AuditTable, record_id: i64, row: Value, user_id: i64) -> Self {
        Self {
            table,
            record_id,
            operation: AuditOperation::Delete,
            changed_fields: object_keys(&row),
            old_values: Some(row),
            new_values: None,
            user_id,
            reason: None,
            rollback_of: None,
        }
    }

    /// Record the compensating write of a rollback
    pub fn rollback(
        table: AuditTable,
        record_id: i64,
        rollback_of: i64,
        old_values: Option<Value>,
        new_values: Option<Value>,
        user_id: i64,
        reason: Option<String>,
    ) -> Self {
        let changed_fields = match (&old_values, &new_values) {
            (_, Some(values)) | (Some(values), None) => object_keys(values),
            (None, None) => Vec::new(),
        };
        Self {
            table,
            record_id,
            operation: AuditOperation::Rollback,
            old_values,
            new_values,
            changed_fields,
            user_id,
            reason,
            rollback_of: Some(rollback_of),
        }
    }
}

fn object_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::audit::diff_snapshots;

    #[test]
    fn test_created_keeps_full_row() {
        let row = json!({"id": 4, "title": "hello"});
        let log = NewAuditLog::created(AuditTable::Announcements, 4, row.clone(), 9);
        assert_eq!(log.operation, AuditOperation::Create);
        assert!(log.old_values.is_none());
        assert_eq!(log.new_values, Some(row));
        assert_eq!(log.user_id, 9);
    }

    #[test]
    fn test_updated_keeps_only_diff() {
        let before = json!({"id": 1, "title": "a", "content": "x", "updated_at": "t1"});
        let after = json!({"id": 1, "title": "b", "content": "x", "updated_at": "t2"});
        let log = NewAuditLog::updated(AuditTable::Announcements, 1, diff_snapshots(&before, &after), 2);
        assert_eq!(log.old_values, Some(json!({"title": "a"})));
        assert_eq!(log.new_values, Some(json!({"title": "b"})));
        assert_eq!(log.changed_fields, vec!["title".to_string()]);
    }

    #[test]
    fn test_deleted_keeps_full_row() {
        let row = json!({"id": 3, "title": "bye"});
        let log = NewAuditLog::deleted(AuditTable::Announcements, 3, row.clone(), 1);
        assert_eq!(log.old_values, Some(row));
        assert!(log.new_values.is_none());
    }

    #[test]
    fn test_rollback_links_original() {
        let log = NewAuditLog::rollback(
            AuditTable::Applications,
            5,
            42,
            Some(json!({"app_name": "new"})),
            Some(json!({"app_name": "old"})),
            1,
            Some("typo".to_string()),
        );
        assert_eq!(log.operation, AuditOperation::Rollback);
        assert_eq!(log.rollback_of, Some(42));
        assert_eq!(log.changed_fields, vec!["app_name".to_string()]);
    }

    #[test]
    fn test_operation_text_is_uppercase() {
        assert_eq!(AuditOperation::Rollback.as_str(), "ROLLBACK");
        assert_eq!("UPDATE".parse::<AuditOperation>().unwrap(), AuditOperation::Update);
    }
}
