//! # migtrack-core
//!
//! Domain layer containing entities, value objects, audit planning and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod audit;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use audit::{
    diff_snapshots, plan_rollback, rollback_target, AuditTable, RollbackAction, SnapshotDiff,
};
pub use entities::{
    Announcement, AnnouncementStatus, Application, ApplicationStatus, AuditLog, AuditOperation,
    NewAnnouncement, NewApplication, NewAuditLog, NewNotification, NewSubTask,
    NewTaskAssignment, NewUser, Notification, NotificationType, Priority, SubTask, SubTaskStatus,
    TaskAssignment, TaskStatus, TaskType, TransformationTarget, User,
};
pub use error::DomainError;
pub use traits::{
    AnnouncementFilter, AnnouncementRepository, ApplicationFilter, ApplicationRepository,
    ApplicationSort, AuditLogFilter, AuditLogRepository, AuditStatistics, AuditWindow,
    ColumnSchema, DashboardFilter, DashboardStats, NotificationRepository, Patch, QueryOutput,
    QueryRepository, RepoResult, RollbackOutcome, SortOrder, SubTaskFilter, SubTaskRepository,
    TableSchema, TaskAssignmentFilter, TaskAssignmentRepository, UserCount, UserRepository,
};
pub use value_objects::{total_pages, Page, PageRequest, ParseEnumError, UserRole};
