//! Audit log model -> entity mapper

use migtrack_core::entities::{AuditLog, AuditOperation};

use super::parse_text;
use crate::models::AuditLogModel;

impl From<AuditLogModel> for AuditLog {
    fn from(model: AuditLogModel) -> Self {
        AuditLog {
            id: model.id,
            table_name: model.table_name,
            record_id: model.record_id,
            operation: parse_text("operation", &model.operation, AuditOperation::Update),
            old_values: model.old_values,
            new_values: model.new_values,
            changed_fields: model.changed_fields,
            user_id: model.user_id,
            reason: model.reason,
            rollback_of: model.rollback_of,
            created_at: model.created_at,
        }
    }
}
