//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`. Query-string filters are
//! plain `Deserialize` structs that convert into repository filters.
//!
//! Update requests are partial: a field that is absent (or `null`) leaves
//! the stored value untouched.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use validator::Validate;

use migtrack_core::entities::{
    AnnouncementStatus, ApplicationStatus, AuditOperation, Priority, SubTaskStatus, TaskStatus,
    TaskType, TransformationTarget,
};
use migtrack_core::traits::{
    AnnouncementFilter, ApplicationFilter, ApplicationSort, AuditLogFilter, DashboardFilter,
    SortOrder, SubTaskFilter, TaskAssignmentFilter,
};
use migtrack_core::UserRole;

// ============================================================================
// Auth Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 100))]
    pub department: Option<String>,

    #[validate(length(max = 100))]
    pub team: Option<String>,
}

/// User login request. `username` accepts either the username or the email.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// ============================================================================
// User Requests
// ============================================================================

/// Admin change of role and/or active flag
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserAccessRequest {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

// ============================================================================
// Application Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 50, message = "L2 id must be 1-50 characters"))]
    pub l2_id: String,

    #[validate(length(min = 1, max = 200, message = "Application name must be 1-200 characters"))]
    pub app_name: String,

    #[validate(range(min = 2000, max = 2100, message = "Supervision year must be 2000-2100"))]
    pub supervision_year: i32,

    pub transformation_target: TransformationTarget,

    #[validate(length(max = 100))]
    pub current_stage: Option<String>,

    pub overall_status: Option<ApplicationStatus>,

    #[validate(length(min = 1, max = 100, message = "Responsible team must be 1-100 characters"))]
    pub responsible_team: String,

    #[validate(length(max = 100))]
    pub responsible_person: Option<String>,

    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateApplicationRequest {
    #[validate(length(min = 1, max = 50, message = "L2 id must be 1-50 characters"))]
    pub l2_id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Application name must be 1-200 characters"))]
    pub app_name: Option<String>,

    #[validate(range(min = 2000, max = 2100, message = "Supervision year must be 2000-2100"))]
    pub supervision_year: Option<i32>,

    pub transformation_target: Option<TransformationTarget>,

    #[validate(length(max = 100))]
    pub current_stage: Option<String>,

    pub overall_status: Option<ApplicationStatus>,

    #[validate(length(min = 1, max = 100, message = "Responsible team must be 1-100 characters"))]
    pub responsible_team: Option<String>,

    #[validate(length(max = 100))]
    pub responsible_person: Option<String>,

    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

/// Query string of `GET /applications`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub l2_id: Option<String>,
    pub app_name: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub team: Option<String>,
    pub year: Option<i32>,
    pub target: Option<TransformationTarget>,
    pub is_delayed: Option<bool>,
    pub sort_by: Option<ApplicationSort>,
    pub sort_order: Option<SortOrder>,
}

impl From<ApplicationListQuery> for ApplicationFilter {
    fn from(query: ApplicationListQuery) -> Self {
        Self {
            l2_id: non_blank(query.l2_id),
            app_name: non_blank(query.app_name),
            status: query.status,
            team: non_blank(query.team),
            year: query.year,
            target: query.target,
            is_delayed: query.is_delayed,
            sort_by: query.sort_by.unwrap_or_default(),
            sort_order: query.sort_order.unwrap_or_default(),
        }
    }
}

// ============================================================================
// SubTask Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubTaskRequest {
    pub application_id: i64,

    #[validate(length(min = 1, max = 100, message = "Module name must be 1-100 characters"))]
    pub module_name: String,

    pub sub_target: TransformationTarget,

    #[validate(length(max = 50))]
    pub version_name: Option<String>,

    pub task_status: Option<SubTaskStatus>,

    #[validate(range(min = 0, max = 100, message = "Progress must be 0-100"))]
    pub progress_percentage: Option<i32>,

    pub is_blocked: Option<bool>,
    pub block_reason: Option<String>,

    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,

    pub requirements: Option<String>,
    pub technical_notes: Option<String>,

    #[validate(range(min = 1, max = 4, message = "Priority must be 1-4"))]
    pub priority: Option<i32>,

    #[validate(range(min = 0))]
    pub estimated_hours: Option<i32>,

    #[validate(range(min = 0))]
    pub actual_hours: Option<i32>,

    #[validate(length(max = 100))]
    pub assigned_to: Option<String>,

    #[validate(length(max = 100))]
    pub reviewer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubTaskRequest {
    /// Move the subtask to another application
    pub application_id: Option<i64>,

    #[validate(length(min = 1, max = 100, message = "Module name must be 1-100 characters"))]
    pub module_name: Option<String>,

    pub sub_target: Option<TransformationTarget>,

    #[validate(length(max = 50))]
    pub version_name: Option<String>,

    pub task_status: Option<SubTaskStatus>,

    #[validate(range(min = 0, max = 100, message = "Progress must be 0-100"))]
    pub progress_percentage: Option<i32>,

    pub is_blocked: Option<bool>,
    pub block_reason: Option<String>,

    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,

    pub requirements: Option<String>,
    pub technical_notes: Option<String>,

    #[validate(range(min = 1, max = 4, message = "Priority must be 1-4"))]
    pub priority: Option<i32>,

    #[validate(range(min = 0))]
    pub estimated_hours: Option<i32>,

    #[validate(range(min = 0))]
    pub actual_hours: Option<i32>,

    #[validate(length(max = 100))]
    pub assigned_to: Option<String>,

    #[validate(length(max = 100))]
    pub reviewer: Option<String>,
}

/// Query string of `GET /subtasks`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubTaskListQuery {
    pub application_id: Option<i64>,
    pub sub_target: Option<TransformationTarget>,
    pub task_status: Option<SubTaskStatus>,
    pub is_blocked: Option<bool>,
    pub assigned_to: Option<String>,
    pub version_name: Option<String>,
}

impl From<SubTaskListQuery> for SubTaskFilter {
    fn from(query: SubTaskListQuery) -> Self {
        Self {
            application_id: query.application_id,
            sub_target: query.sub_target,
            task_status: query.task_status,
            is_blocked: query.is_blocked,
            assigned_to: non_blank(query.assigned_to),
            version_name: non_blank(query.version_name),
        }
    }
}

// ============================================================================
// Task Assignment Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskAssignmentRequest {
    pub application_id: i64,
    pub assigned_to_user_id: i64,

    #[serde(default)]
    pub task_type: TaskType,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskAssignmentRequest {
    pub task_type: Option<TaskType>,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

/// Query string of `GET /task-assignments`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskAssignmentListQuery {
    pub assigned_to_user_id: Option<i64>,
    pub assigned_by_user_id: Option<i64>,
    pub application_id: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub task_type: Option<TaskType>,
}

impl From<TaskAssignmentListQuery> for TaskAssignmentFilter {
    fn from(query: TaskAssignmentListQuery) -> Self {
        Self {
            assigned_to_user_id: query.assigned_to_user_id,
            assigned_by_user_id: query.assigned_by_user_id,
            application_id: query.application_id,
            status: query.status,
            priority: query.priority,
            task_type: query.task_type,
        }
    }
}

/// Query string of `GET /task-assignments/my`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyTasksQuery {
    pub status: Option<TaskStatus>,
    pub limit: Option<u32>,
}

// ============================================================================
// Announcement Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: AnnouncementStatus,

    #[serde(default)]
    pub is_pinned: bool,

    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    pub priority: Option<Priority>,
    pub status: Option<AnnouncementStatus>,
    pub is_pinned: Option<bool>,
    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PinAnnouncementRequest {
    pub is_pinned: bool,
}

/// Query string of `GET /announcements`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementListQuery {
    pub status: Option<AnnouncementStatus>,
    pub priority: Option<Priority>,
    pub is_pinned: Option<bool>,
}

impl From<AnnouncementListQuery> for AnnouncementFilter {
    fn from(query: AnnouncementListQuery) -> Self {
        Self {
            status: query.status,
            priority: query.priority,
            is_pinned: query.is_pinned,
        }
    }
}

/// Query string of `GET /announcements/active`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveAnnouncementsQuery {
    pub limit: Option<u32>,
}

// ============================================================================
// Notification Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

// ============================================================================
// Audit Requests
// ============================================================================

/// Query string of `GET /audit-logs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogListQuery {
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub operation: Option<AuditOperation>,
    pub user_id: Option<i64>,
}

impl From<AuditLogListQuery> for AuditLogFilter {
    fn from(query: AuditLogListQuery) -> Self {
        Self {
            table_name: non_blank(query.table_name),
            record_id: query.record_id,
            operation: query.operation,
            user_id: query.user_id,
        }
    }
}

/// Inclusive calendar-day range of `GET /audit-logs/statistics`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditStatisticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query string of `GET /audit-logs/users/:id/activity`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserActivityQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Most recent entries returned, 1-500, default 100
    pub limit: Option<u32>,
}

/// Body of `POST /audit-logs/:id/rollback`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RollbackRequest {
    /// Must be `true`; anything else is rejected before the log is read
    #[serde(default)]
    pub confirm: bool,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Dashboard Requests
// ============================================================================

/// Look-back period of the dashboard, by last update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardPeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl DashboardPeriod {
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }
}

/// Query string of `GET /dashboard/stats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub team: Option<String>,
    pub period: Option<DashboardPeriod>,
}

impl DashboardQuery {
    /// Repository scope as of `now`
    pub fn into_filter(self, now: DateTime<Utc>) -> DashboardFilter {
        DashboardFilter {
            team: non_blank(self.team),
            updated_since: self.period.map(|p| now - Duration::days(p.days())),
        }
    }
}

// ============================================================================
// MCP Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct McpQueryRequest {
    #[validate(length(min = 1, max = 10000, message = "Query must be 1-10000 characters"))]
    pub query: String,

    #[validate(range(min = 1, message = "Limit must be positive"))]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct McpSchemaQuery {
    pub table_name: Option<String>,
}

/// Treat empty query-string values as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_query_scope() {
        let now = Utc::now();
        let filter = DashboardQuery {
            team: Some("  ".to_string()),
            period: Some(DashboardPeriod::Quarter),
        }
        .into_filter(now);
        assert_eq!(filter.team, None);
        assert_eq!(filter.updated_since, Some(now - Duration::days(90)));

        let filter = DashboardQuery::default().into_filter(now);
        assert_eq!(filter.updated_since, None);

        let query: DashboardQuery =
            serde_json::from_value(serde_json::json!({"period": "week", "team": "core"})).unwrap();
        assert_eq!(query.period, Some(DashboardPeriod::Week));
        assert!(serde_json::from_value::<DashboardQuery>(serde_json::json!({"period": "decade"}))
            .is_err());
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterRequest {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "Secret123".to_string(),
            full_name: None,
            department: None,
            team: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn test_application_query_defaults_sort() {
        let filter = ApplicationFilter::from(ApplicationListQuery {
            app_name: Some("  ".to_string()),
            team: Some(" core ".to_string()),
            ..Default::default()
        });
        assert_eq!(filter.sort_by, ApplicationSort::UpdatedAt);
        assert_eq!(filter.sort_order, SortOrder::Desc);
        assert!(filter.app_name.is_none());
        assert_eq!(filter.team.as_deref(), Some("core"));
    }

    #[test]
    fn test_rollback_confirm_defaults_to_false() {
        let request: RollbackRequest = serde_json::from_str(r#"{"reason": "typo"}"#).unwrap();
        assert!(!request.confirm);
    }

    #[test]
    fn test_subtask_progress_range() {
        let request = UpdateSubTaskRequest {
            progress_percentage: Some(101),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_task_assignment_defaults() {
        let request: CreateTaskAssignmentRequest = serde_json::from_str(
            r#"{"application_id": 1, "assigned_to_user_id": 2, "title": "Fill dates"}"#,
        )
        .unwrap();
        assert_eq!(request.task_type, TaskType::General);
        assert_eq!(request.priority, Priority::Medium);
    }
}
