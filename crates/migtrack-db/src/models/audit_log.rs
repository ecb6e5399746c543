//! Audit log database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for audit_logs table
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogModel {
    pub id: i64,
    pub table_name: String,
    pub record_id: i64,
    /// CREATE, UPDATE, DELETE or ROLLBACK
    pub operation: String,
    /// Row snapshot (or changed columns) before the mutation
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
    pub changed_fields: Vec<String>,
    pub user_id: Option<i64>,
    pub reason: Option<String>,
    pub rollback_of: Option<i64>,
    pub created_at: DateTime<Utc>,
}
