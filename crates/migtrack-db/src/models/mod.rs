//! Database models - SQLx-compatible structs for PostgreSQL tables
//!
//! Enumerations are stored as text and parsed by the mappers.

mod announcement;
mod application;
mod audit_log;
mod notification;
mod subtask;
mod task_assignment;
mod user;

pub use announcement::AnnouncementModel;
pub use application::{ApplicationModel, DashboardStatsModel};
pub use audit_log::AuditLogModel;
pub use notification::NotificationModel;
pub use subtask::SubTaskModel;
pub use task_assignment::TaskAssignmentModel;
pub use user::UserModel;
