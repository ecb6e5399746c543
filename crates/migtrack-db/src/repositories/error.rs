//! Error handling utilities for repositories

use migtrack_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for foreign key violation and return appropriate error or fallback
pub fn map_fk_violation<F>(e: SqlxError, on_fk: F) -> DomainError
where
    F: FnOnce(&str) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return on_fk(db_err.message());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Escape LIKE wildcards and wrap for a substring match
pub fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// COUNT(*) is never negative
pub fn to_total(count: i64) -> u64 {
    count.max(0) as u64
}

/// Create a "user not found" error
pub fn user_not_found(id: i64) -> DomainError {
    DomainError::UserNotFound(id)
}

/// Create an "application not found" error
pub fn application_not_found(id: i64) -> DomainError {
    DomainError::ApplicationNotFound(id)
}

/// Create a "subtask not found" error
pub fn subtask_not_found(id: i64) -> DomainError {
    DomainError::SubTaskNotFound(id)
}

/// Create a "task assignment not found" error
pub fn task_assignment_not_found(id: i64) -> DomainError {
    DomainError::TaskAssignmentNotFound(id)
}

/// Create an "announcement not found" error
pub fn announcement_not_found(id: i64) -> DomainError {
    DomainError::AnnouncementNotFound(id)
}

/// Create a "notification not found" error
pub fn notification_not_found(id: i64) -> DomainError {
    DomainError::NotificationNotFound(id)
}

/// Create an "audit log not found" error
pub fn audit_log_not_found(id: i64) -> DomainError {
    DomainError::AuditLogNotFound(id)
}
