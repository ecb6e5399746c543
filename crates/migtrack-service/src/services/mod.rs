//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod announcement;
pub mod application;
pub mod audit;
pub mod auth;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod mcp;
pub mod menu;
pub mod notification;
pub mod permission;
pub mod subtask;
pub mod task_assignment;
pub mod user;

// Re-export all services for convenience
pub use announcement::AnnouncementService;
pub use application::ApplicationService;
pub use audit::AuditService;
pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use dashboard::DashboardService;
pub use error::{ServiceError, ServiceResult};
pub use mcp::{is_safe_sql_query, McpService};
pub use menu::{menu_for_role, MenuService};
pub use notification::NotificationService;
pub use permission::PermissionService;
pub use subtask::SubTaskService;
pub use task_assignment::TaskAssignmentService;
pub use user::UserService;
