//! Summaries derived from a set of audit entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::entities::{AuditLog, AuditOperation};

/// How many of the most edited columns a change summary lists
pub const MOST_CHANGED_LIMIT: usize = 5;

/// What happened to one record over its whole history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSummary {
    pub total_operations: usize,
    /// UPDATE entries that changed at least one column
    pub total_changes: usize,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub last_modified_by: Option<i64>,
    /// Entry count keyed by operation text, every operation present
    pub operations: BTreeMap<String, u64>,
    /// UPDATE count per column
    pub field_changes: BTreeMap<String, u64>,
    /// Most edited columns, highest count first, ties by name
    pub most_changed_fields: Vec<(String, u64)>,
}

/// Summarize the history of one record. `history` is in any order.
pub fn summarize_changes(history: &[AuditLog]) -> ChangeSummary {
    let mut summary = ChangeSummary {
        total_operations: history.len(),
        operations: AuditOperation::ALL
            .iter()
            .map(|op| (op.as_str().to_string(), 0))
            .collect(),
        ..ChangeSummary::default()
    };

    let creation = history
        .iter()
        .filter(|log| log.operation == AuditOperation::Create)
        .min_by_key(|log| (log.created_at, log.id));
    summary.created_at = creation.map(|log| log.created_at);
    summary.created_by = creation.and_then(|log| log.user_id);

    let latest = history.iter().max_by_key(|log| (log.created_at, log.id));
    summary.last_modified_at = latest.map(|log| log.created_at);
    summary.last_modified_by = latest.and_then(|log| log.user_id);

    for log in history {
        *summary
            .operations
            .entry(log.operation.as_str().to_string())
            .or_default() += 1;
        if log.operation == AuditOperation::Update && !log.changed_fields.is_empty() {
            summary.total_changes += 1;
            for field in &log.changed_fields {
                *summary.field_changes.entry(field.clone()).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<(String, u64)> = summary
        .field_changes
        .iter()
        .map(|(field, count)| (field.clone(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MOST_CHANGED_LIMIT);
    summary.most_changed_fields = ranked;

    summary
}

/// Operation counts and touched tables of a user's entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityBreakdown {
    /// Keyed by operation text
    pub operations: BTreeMap<String, u64>,
    /// Sorted, without duplicates
    pub tables: Vec<String>,
}

pub fn activity_breakdown(logs: &[AuditLog]) -> ActivityBreakdown {
    let mut breakdown = ActivityBreakdown::default();
    for log in logs {
        *breakdown
            .operations
            .entry(log.operation.as_str().to_string())
            .or_default() += 1;
        breakdown.tables.push(log.table_name.clone());
    }
    breakdown.tables.sort();
    breakdown.tables.dedup();
    breakdown
}
