//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Listing endpoints return `migtrack_core::Page<T>` of these.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use migtrack_core::entities::{
    AnnouncementStatus, ApplicationStatus, AuditOperation, NotificationType, Priority,
    SubTaskStatus, TaskStatus, TaskType, TransformationTarget,
};
use migtrack_core::traits::{TableSchema, UserCount};
use migtrack_core::UserRole;

// ============================================================================
// Auth / User Responses
// ============================================================================

/// Authentication response (login/register/refresh)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: UserResponse,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub team: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Application / SubTask Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub id: i64,
    pub l2_id: String,
    pub app_name: String,
    pub supervision_year: i32,
    pub transformation_target: TransformationTarget,
    pub is_ak_completed: bool,
    pub is_cloud_native_completed: bool,
    pub current_stage: Option<String>,
    pub overall_status: ApplicationStatus,
    pub responsible_team: String,
    pub responsible_person: Option<String>,
    pub progress_percentage: i32,
    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,
    pub is_delayed: bool,
    pub delay_days: i32,
    pub notes: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subtask plus fields computed at response time
#[derive(Debug, Clone, Serialize)]
pub struct SubTaskResponse {
    pub id: i64,
    pub application_id: i64,
    pub module_name: String,
    pub sub_target: TransformationTarget,
    pub version_name: Option<String>,
    pub task_status: SubTaskStatus,
    pub progress_percentage: i32,
    pub is_blocked: bool,
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
    pub priority: i32,
    pub estimated_hours: Option<i32>,
    pub actual_hours: Option<i32>,
    pub assigned_to: Option<String>,
    pub reviewer: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_completed: bool,
    pub is_overdue: bool,
    pub days_delayed: i64,
}

// ============================================================================
// Task Assignment Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TaskAssignmentResponse {
    pub id: i64,
    pub application_id: i64,
    pub assigned_to_user_id: i64,
    pub assigned_by_user_id: i64,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Announcement Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub status: AnnouncementStatus,
    pub created_by_user_id: i64,
    pub is_pinned: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Visible right now
    pub is_active: bool,
}

// ============================================================================
// Notification Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// ============================================================================
// Audit Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub table_name: String,
    pub record_id: i64,
    pub operation: AuditOperation,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub changed_fields: Vec<String>,
    pub user_id: Option<i64>,
    pub reason: Option<String>,
    pub rollback_of: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Every audit entry of one record, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct RecordHistoryResponse {
    pub table_name: String,
    pub record_id: i64,
    pub total_operations: usize,
    pub history: Vec<AuditLogResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AffectedRecord {
    pub table: String,
    pub id: i64,
    /// Operation of the entry that was undone
    pub operation: AuditOperation,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollbackResponse {
    pub status: String,
    pub rollback_audit_id: i64,
    pub affected_record: AffectedRecord,
    pub restored_record: Option<Value>,
    pub message: String,
}

/// Aggregates over the audit trail in a date range
#[derive(Debug, Clone, Serialize)]
pub struct AuditStatisticsResponse {
    pub total_logs: u64,
    pub by_operation: BTreeMap<String, u64>,
    pub by_table: BTreeMap<String, u64>,
    pub top_users: Vec<UserCount>,
    /// Hour of day (UTC) to entry count
    pub activity_by_hour: BTreeMap<u32, u64>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserActivityResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_operations: usize,
    pub operations_breakdown: BTreeMap<String, u64>,
    pub tables_affected: Vec<String>,
    /// Newest first
    pub recent_activity: Vec<AuditLogResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChangeCount {
    pub field: String,
    pub count: u64,
}

/// Change summary of one record
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSummaryResponse {
    pub table_name: String,
    pub record_id: i64,
    pub total_operations: usize,
    pub total_changes: usize,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub last_modified_by: Option<i64>,
    pub operations_breakdown: BTreeMap<String, u64>,
    pub field_changes: BTreeMap<String, u64>,
    pub most_changed_fields: Vec<FieldChangeCount>,
}

// ============================================================================
// Dashboard Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatsResponse {
    pub total_applications: u64,
    pub active_applications: u64,
    pub completed_applications: u64,
    pub blocked_applications: u64,
    pub delayed_applications: u64,
    pub ak_completed_applications: u64,
    pub cloud_native_completed_applications: u64,
    pub both_completed_applications: u64,
    pub ak_target_applications: u64,
    pub cloud_native_target_applications: u64,
    /// Percent of AK-target applications with AK work complete
    pub ak_completion_rate: f64,
    pub cloud_native_completion_rate: f64,
    pub average_progress: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Menu Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub id: &'static str,
    pub title: &'static str,
    pub order: u32,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuResponse {
    pub user_role: UserRole,
    pub menu_groups: Vec<MenuGroup>,
}

// ============================================================================
// MCP Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct McpTool {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema of the arguments
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpToolsResponse {
    pub tools: Vec<McpTool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResultResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaResponse {
    pub tables: Vec<TableSchema>,
}

// ============================================================================
// Health Check Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
