//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in migtrack-core.
//! Each repository handles database operations for a specific domain entity.

mod announcement;
mod application;
mod audit_log;
mod audit_trail;
mod error;
mod notification;
mod query;
mod subtask;
mod task_assignment;
mod user;

pub use announcement::PgAnnouncementRepository;
pub use application::PgApplicationRepository;
pub use audit_log::PgAuditLogRepository;
pub use notification::PgNotificationRepository;
pub use query::PgQueryRepository;
pub use subtask::PgSubTaskRepository;
pub use task_assignment::PgTaskAssignmentRepository;
pub use user::PgUserRepository;
