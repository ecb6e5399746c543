//! Domain entities - core business objects

mod announcement;
mod application;
mod audit_log;
mod notification;
mod subtask;
mod task_assignment;
mod user;

pub use announcement::{Announcement, AnnouncementStatus, NewAnnouncement};
pub use application::{Application, ApplicationStatus, NewApplication, TransformationTarget};
pub use audit_log::{AuditLog, AuditOperation, NewAuditLog};
pub use notification::{NewNotification, Notification, NotificationType};
pub use subtask::{NewSubTask, SubTask, SubTaskStatus};
pub use task_assignment::{NewTaskAssignment, Priority, TaskAssignment, TaskStatus, TaskType};
pub use user::{NewUser, User};
