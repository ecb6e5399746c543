//! Test fixtures and data generators
//!
//! Request builders with unique values and client-side mirrors of the
//! response bodies the tests inspect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Password that satisfies the strength rules
pub const TEST_PASSWORD: &str = "TestPass123";

fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl RegisterRequest {
    /// Create a unique registration request
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("user_{suffix}"),
            email: format!("user_{suffix}@example.com"),
            password: TEST_PASSWORD.to_string(),
            full_name: Some(format!("Test User {suffix}")),
        }
    }

    /// Same as `unique` with a specific password
    pub fn with_password(password: &str) -> Self {
        Self {
            password: password.to_string(),
            ..Self::unique()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateApplicationRequest {
    pub l2_id: String,
    pub app_name: String,
    pub supervision_year: i32,
    pub transformation_target: String,
    pub responsible_team: String,
}

impl CreateApplicationRequest {
    /// Create a unique application request targeting `ak`
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            l2_id: format!("L2-{suffix}"),
            app_name: format!("App {suffix}"),
            supervision_year: 2025,
            transformation_target: "ak".to_string(),
            responsible_team: format!("team_{suffix}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubTaskRequest {
    pub application_id: i64,
    pub module_name: String,
    pub sub_target: String,
}

impl CreateSubTaskRequest {
    pub fn for_application(application_id: i64) -> Self {
        Self {
            application_id,
            module_name: format!("module_{}", unique_suffix()),
            sub_target: "ak".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskAssignmentRequest {
    pub application_id: i64,
    pub assigned_to_user_id: i64,
    pub task_type: String,
    pub title: String,
    pub priority: String,
}

impl CreateTaskAssignmentRequest {
    pub fn new(application_id: i64, assigned_to_user_id: i64) -> Self {
        Self {
            application_id,
            assigned_to_user_id,
            task_type: "update_progress".to_string(),
            title: format!("Update progress {}", unique_suffix()),
            priority: "high".to_string(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationResponse {
    pub id: i64,
    pub l2_id: String,
    pub app_name: String,
    pub overall_status: String,
    pub responsible_team: String,
    pub progress_percentage: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubTaskResponse {
    pub id: i64,
    pub application_id: i64,
    pub task_status: String,
    pub progress_percentage: i32,
    pub is_blocked: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskAssignmentResponse {
    pub id: i64,
    pub assigned_to_user_id: i64,
    pub assigned_by_user_id: i64,
    pub status: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementResponse {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub is_pinned: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub notification_type: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub table_name: String,
    pub record_id: i64,
    pub operation: String,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub changed_fields: Vec<String>,
    pub rollback_of: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordHistory {
    pub table_name: String,
    pub record_id: i64,
    pub total_operations: usize,
    pub history: Vec<AuditLogResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AffectedRecord {
    pub table: String,
    pub id: i64,
    pub operation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RollbackResponse {
    pub status: String,
    pub rollback_audit_id: i64,
    pub affected_record: AffectedRecord,
    pub restored_record: Option<Value>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCount {
    pub user_id: i64,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditStatisticsResponse {
    pub total_logs: u64,
    pub by_operation: BTreeMap<String, u64>,
    pub by_table: BTreeMap<String, u64>,
    pub top_users: Vec<UserCount>,
    pub activity_by_hour: BTreeMap<u32, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserActivityResponse {
    pub user_id: i64,
    pub username: String,
    pub total_operations: usize,
    pub operations_breakdown: BTreeMap<String, u64>,
    pub tables_affected: Vec<String>,
    pub recent_activity: Vec<AuditLogResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldChangeCount {
    pub field: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeSummaryResponse {
    pub record_id: i64,
    pub total_operations: usize,
    pub total_changes: usize,
    pub created_by: Option<i64>,
    pub last_modified_by: Option<i64>,
    pub operations_breakdown: BTreeMap<String, u64>,
    pub field_changes: BTreeMap<String, u64>,
    pub most_changed_fields: Vec<FieldChangeCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStatsResponse {
    pub total_applications: u64,
    pub completed_applications: u64,
    pub ak_target_applications: u64,
    pub ak_completion_rate: f64,
    pub cloud_native_completion_rate: f64,
    pub average_progress: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuGroup {
    pub id: String,
    pub order: u32,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuResponse {
    pub user_role: String,
    pub menu_groups: Vec<MenuGroup>,
}

impl MenuResponse {
    pub fn group_ids(&self) -> Vec<&str> {
        self.menu_groups.iter().map(|g| g.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}
