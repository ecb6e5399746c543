//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::UserRole;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Application not found: {0}")]
    ApplicationNotFound(i64),

    #[error("Subtask not found: {0}")]
    SubTaskNotFound(i64),

    #[error("Task assignment not found: {0}")]
    TaskAssignmentNotFound(i64),

    #[error("Announcement not found: {0}")]
    AnnouncementNotFound(i64),

    #[error("Notification not found: {0}")]
    NotificationNotFound(i64),

    #[error("Audit log not found: {0}")]
    AuditLogNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Query rejected: {0}")]
    UnsafeQuery(String),

    #[error("Cannot roll back: {0}")]
    NotRestorable(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Requires role {required} or higher")]
    InsufficientRole { required: UserRole },

    #[error("Only the assignee or a manager may change this task")]
    NotTaskParticipant,

    #[error("Account is disabled")]
    AccountDisabled,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Username already in use")]
    UsernameAlreadyExists,

    #[error("Application with L2 id {0} already exists")]
    L2IdAlreadyExists(String),

    #[error("Record {table}/{id} has been deleted since this change")]
    RecordDeleted { table: String, id: i64 },

    #[error("Record {table}/{id} has been modified since this change")]
    RecordModified { table: String, id: i64 },

    #[error("Record {table}/{id} already exists")]
    RecordExists { table: String, id: i64 },

    #[error("Referential integrity violation: {0}")]
    ReferentialConflict(String),

    #[error("Restored values clash with another record: {0}")]
    RestoreConflict(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ApplicationNotFound(_) => "UNKNOWN_APPLICATION",
            Self::SubTaskNotFound(_) => "UNKNOWN_SUBTASK",
            Self::TaskAssignmentNotFound(_) => "UNKNOWN_TASK_ASSIGNMENT",
            Self::AnnouncementNotFound(_) => "UNKNOWN_ANNOUNCEMENT",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",
            Self::AuditLogNotFound(_) => "UNKNOWN_AUDIT_LOG",
            Self::TableNotFound(_) => "UNKNOWN_TABLE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::UnsafeQuery(_) => "UNSAFE_QUERY",
            Self::NotRestorable(_) => "NOT_RESTORABLE",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            // Authorization
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::NotTaskParticipant => "NOT_TASK_PARTICIPANT",
            Self::AccountDisabled => "ACCOUNT_DISABLED",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::L2IdAlreadyExists(_) => "L2_ID_ALREADY_EXISTS",
            Self::RecordDeleted { .. } => "RECORD_DELETED",
            Self::RecordModified { .. } => "RECORD_MODIFIED",
            Self::RecordExists { .. } => "RECORD_EXISTS",
            Self::ReferentialConflict(_) => "REFERENTIAL_CONFLICT",
            Self::RestoreConflict(_) => "RESTORE_CONFLICT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ApplicationNotFound(_)
                | Self::SubTaskNotFound(_)
                | Self::TaskAssignmentNotFound(_)
                | Self::AnnouncementNotFound(_)
                | Self::NotificationNotFound(_)
                | Self::AuditLogNotFound(_)
                | Self::TableNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidQuery(_)
                | Self::UnsafeQuery(_)
                | Self::NotRestorable(_)
                | Self::WeakPassword(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::InsufficientRole { .. } | Self::NotTaskParticipant | Self::AccountDisabled
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::UsernameAlreadyExists
                | Self::L2IdAlreadyExists(_)
                | Self::RecordDeleted { .. }
                | Self::RecordModified { .. }
                | Self::RecordExists { .. }
                | Self::ReferentialConflict(_)
                | Self::RestoreConflict(_)
        )
    }
}
