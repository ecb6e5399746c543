//! Rollback planning
//!
//! Decides, from an audit entry and the current state of its record, which
//! compensating write restores the earlier state. The caller runs the write
//! and records a ROLLBACK entry in the same transaction.

use serde_json::{Map, Value};

use super::AuditTable;
use crate::entities::{AuditLog, AuditOperation};
use crate::error::DomainError;

/// Compensating write for one audit entry
#[derive(Debug, Clone, PartialEq)]
pub enum RollbackAction {
    /// Write these columns back onto the existing row
    Restore { values: Map<String, Value> },
    /// Insert the full row again, original id included
    Reinsert { row: Map<String, Value> },
    /// Delete the row that the entry created
    Remove,
}

/// Resolve the audited table an entry can be rolled back on.
///
/// ROLLBACK entries and entries on unaudited tables are rejected.
pub fn rollback_target(log: &AuditLog) -> Result<AuditTable, DomainError> {
    if log.operation == AuditOperation::Rollback {
        return Err(DomainError::NotRestorable(
            "rollback entries cannot themselves be rolled back".to_string(),
        ));
    }
    log.table_name
        .parse()
        .map_err(|_| DomainError::NotRestorable(format!("table {} is not audited", log.table_name)))
}

/// Plan the rollback of `log`.
///
/// `current` is the locked snapshot of the target row (`None` when it no longer
/// exists). `has_later_changes` reports whether a newer audit entry exists for
/// the same record.
pub fn plan_rollback(
    log: &AuditLog,
    current: Option<&Value>,
    has_later_changes: bool,
) -> Result<RollbackAction, DomainError> {
    let table = rollback_target(log)?;

    let deleted = || DomainError::RecordDeleted {
        table: log.table_name.clone(),
        id: log.record_id,
    };
    let modified = || DomainError::RecordModified {
        table: log.table_name.clone(),
        id: log.record_id,
    };

    let action = match log.operation {
        AuditOperation::Update => {
            let current = current.ok_or_else(deleted)?;
            if has_later_changes || !still_matches(log.new_values.as_ref(), current) {
                return Err(modified());
            }
            let values: Map<String, Value> = as_object(log.old_values.as_ref())
                .into_iter()
                .flatten()
                .filter(|(column, _)| table.is_restorable(column))
                .map(|(column, value)| (column.clone(), value.clone()))
                .collect();
            if values.is_empty() {
                return Err(DomainError::NotRestorable(
                    "entry holds no restorable columns".to_string(),
                ));
            }
            RollbackAction::Restore { values }
        }
        AuditOperation::Delete => {
            if has_later_changes {
                return Err(modified());
            }
            if current.is_some() {
                return Err(DomainError::RecordExists {
                    table: log.table_name.clone(),
                    id: log.record_id,
                });
            }
            let row = as_object(log.old_values.as_ref())
                .cloned()
                .ok_or_else(|| DomainError::NotRestorable("entry holds no row snapshot".to_string()))?;
            RollbackAction::Reinsert { row }
        }
        AuditOperation::Create => {
            let current = current.ok_or_else(deleted)?;
            if has_later_changes || !still_matches(log.new_values.as_ref(), current) {
                return Err(modified());
            }
            RollbackAction::Remove
        }
        AuditOperation::Rollback => {
            return Err(DomainError::NotRestorable(
                "rollback entries cannot themselves be rolled back".to_string(),
            ))
        }
    };

    Ok(action)
}

fn as_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Every recorded column still holds the recorded value
fn still_matches(recorded: Option<&Value>, current: &Value) -> bool {
    let Some(recorded) = as_object(recorded) else {
        return true;
    };
    recorded
        .iter()
        .filter(|(column, _)| column.as_str() != "updated_at")
        .all(|(column, value)| current.get(column).unwrap_or(&Value::Null) == value)
}
