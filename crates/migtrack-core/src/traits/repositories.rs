//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.
//!
//! Mutations on audited tables take the acting user's id. The implementation
//! writes the matching audit entry in the same transaction as the change.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::entities::{
    Announcement, AnnouncementStatus, Application, ApplicationStatus, AuditLog, AuditOperation,
    NewAnnouncement, NewApplication, NewNotification, NewSubTask, NewTaskAssignment, NewUser,
    Notification, Priority, SubTask, SubTaskStatus, TaskAssignment, TaskStatus, TaskType,
    TransformationTarget, User,
};
use crate::error::DomainError;
use crate::value_objects::{text_enum, PageRequest, UserRole};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Edit applied to a row read under lock inside the write transaction.
/// An error aborts the write and is returned unchanged.
pub type Patch<'a, T> = &'a (dyn Fn(&mut T) -> RepoResult<()> + Send + Sync);

// ============================================================================
// Filters
// ============================================================================

text_enum! {
    /// Sortable application columns
    #[derive(Default)]
    pub enum ApplicationSort {
        #[default]
        UpdatedAt => "updated_at",
        CreatedAt => "created_at",
        AppName => "app_name",
        L2Id => "l2_id",
        ProgressPercentage => "progress_percentage",
        DelayDays => "delay_days",
    }
}

text_enum! {
    #[derive(Default)]
    pub enum SortOrder {
        Asc => "asc",
        #[default]
        Desc => "desc",
    }
}

impl SortOrder {
    /// SQL keyword
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Application listing filters. Text filters match substrings.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub l2_id: Option<String>,
    pub app_name: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub team: Option<String>,
    pub year: Option<i32>,
    pub target: Option<TransformationTarget>,
    pub is_delayed: Option<bool>,
    pub sort_by: ApplicationSort,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Default)]
pub struct SubTaskFilter {
    pub application_id: Option<i64>,
    pub sub_target: Option<TransformationTarget>,
    pub task_status: Option<SubTaskStatus>,
    pub is_blocked: Option<bool>,
    pub assigned_to: Option<String>,
    /// Substring match
    pub version_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskAssignmentFilter {
    pub assigned_to_user_id: Option<i64>,
    pub assigned_by_user_id: Option<i64>,
    pub application_id: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub task_type: Option<TaskType>,
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    pub status: Option<AnnouncementStatus>,
    pub priority: Option<Priority>,
    pub is_pinned: Option<bool>,
}

/// Time range of audit entries: `since` inclusive, `before` exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditWindow {
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

/// Dashboard scope. Applications outside it are not counted.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    /// Exact team match
    pub team: Option<String>,
    /// Only applications updated at or after this instant
    pub updated_since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub table_name: Option<String>,
    pub record_id: Option<i64>,
    pub operation: Option<AuditOperation>,
    pub user_id: Option<i64>,
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find user by username or email
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Check if username is already taken
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Number of registered users
    async fn count(&self) -> RepoResult<u64>;

    /// Create a new user
    async fn create(&self, user: &NewUser, password_hash: &str) -> RepoResult<User>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: i64) -> RepoResult<Option<String>>;

    /// List users, oldest first
    async fn list(&self, page: PageRequest) -> RepoResult<(Vec<User>, u64)>;

    /// Change role and/or active flag
    async fn update_access(
        &self,
        id: i64,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> RepoResult<User>;

    /// Record a successful login
    async fn touch_last_login(&self, id: i64) -> RepoResult<()>;
}

// ============================================================================
// Application Repository
// ============================================================================

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Application>>;

    async fn find_by_l2_id(&self, l2_id: &str) -> RepoResult<Option<Application>>;

    /// Filtered page plus the total match count
    async fn list(
        &self,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Application>, u64)>;

    async fn create(&self, application: &NewApplication, actor: i64) -> RepoResult<Application>;

    /// Apply `patch` to the locked row and persist it
    async fn update(
        &self,
        id: i64,
        patch: Patch<'_, Application>,
        actor: i64,
    ) -> RepoResult<Application>;

    /// Delete the application together with its subtasks and assignments
    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()>;

    /// Aggregate counts over the applications in scope
    async fn dashboard_stats(&self, filter: &DashboardFilter) -> RepoResult<DashboardStats>;
}

/// Application counts behind the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_applications: u64,
    /// In development or live for business
    pub active_applications: u64,
    pub completed_applications: u64,
    /// Applications with at least one blocked subtask
    pub blocked_applications: u64,
    pub delayed_applications: u64,
    pub ak_completed_applications: u64,
    pub cloud_native_completed_applications: u64,
    pub both_completed_applications: u64,
    pub ak_target_applications: u64,
    pub cloud_native_target_applications: u64,
    /// AK-target applications whose AK work is complete
    pub ak_target_completed: u64,
    /// Cloud-native-target applications whose cloud-native work is complete
    pub cloud_native_target_completed: u64,
    pub average_progress: f64,
    /// Newest `updated_at` in scope
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// SubTask Repository
// ============================================================================

/// Subtask writes also recompute the parent application in the same transaction.
#[async_trait]
pub trait SubTaskRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<SubTask>>;

    /// All subtasks of one application
    async fn find_by_application(&self, application_id: i64) -> RepoResult<Vec<SubTask>>;

    async fn list(&self, filter: &SubTaskFilter, page: PageRequest)
        -> RepoResult<(Vec<SubTask>, u64)>;

    async fn create(&self, subtask: &NewSubTask, actor: i64) -> RepoResult<SubTask>;

    /// Apply `patch` to the locked row. Both the old and the new parent are recomputed.
    async fn update(&self, id: i64, patch: Patch<'_, SubTask>, actor: i64) -> RepoResult<SubTask>;

    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()>;
}

// ============================================================================
// Task Assignment Repository
// ============================================================================

#[async_trait]
pub trait TaskAssignmentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<TaskAssignment>>;

    /// Filtered page, newest first
    async fn list(
        &self,
        filter: &TaskAssignmentFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<TaskAssignment>, u64)>;

    /// Assignments of one user, newest first
    async fn find_for_assignee(
        &self,
        user_id: i64,
        status: Option<TaskStatus>,
        limit: Option<i64>,
    ) -> RepoResult<Vec<TaskAssignment>>;

    async fn create(&self, task: &NewTaskAssignment, actor: i64) -> RepoResult<TaskAssignment>;

    async fn update(
        &self,
        id: i64,
        patch: Patch<'_, TaskAssignment>,
        actor: i64,
    ) -> RepoResult<TaskAssignment>;

    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()>;
}

// ============================================================================
// Announcement Repository
// ============================================================================

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Announcement>>;

    /// Filtered page, pinned first then newest
    async fn list(
        &self,
        filter: &AnnouncementFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Announcement>, u64)>;

    /// Announcements visible at `now`
    async fn find_active(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        pinned_only: bool,
    ) -> RepoResult<Vec<Announcement>>;

    async fn create(&self, announcement: &NewAnnouncement, actor: i64) -> RepoResult<Announcement>;

    async fn update(
        &self,
        id: i64,
        patch: Patch<'_, Announcement>,
        actor: i64,
    ) -> RepoResult<Announcement>;

    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> RepoResult<Notification>;

    /// Notifications of one user, newest first
    async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> RepoResult<(Vec<Notification>, u64)>;

    async fn unread_count(&self, user_id: i64) -> RepoResult<u64>;

    /// Mark one notification read. Fails with not found unless it belongs to `user_id`.
    async fn mark_read(&self, id: i64, user_id: i64) -> RepoResult<Notification>;

    /// Mark every unread notification read, returning how many changed
    async fn mark_all_read(&self, user_id: i64) -> RepoResult<u64>;
}

// ============================================================================
// Audit Log Repository
// ============================================================================

/// Result of a successful rollback
#[derive(Debug, Clone)]
pub struct RollbackOutcome {
    /// The entry that was rolled back
    pub log: AuditLog,
    /// The compensating ROLLBACK entry
    pub rollback_log: AuditLog,
    /// Row after the rollback; `None` when a created row was removed
    pub restored_record: Option<Value>,
}

/// Number of entries written by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCount {
    pub user_id: i64,
    pub count: u64,
}

/// Aggregates over the audit trail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditStatistics {
    pub total_logs: u64,
    /// Keyed by operation text
    pub by_operation: BTreeMap<String, u64>,
    pub by_table: BTreeMap<String, u64>,
    /// Most active users, highest count first
    pub top_users: Vec<UserCount>,
    /// Entry count per hour of day (0-23), only hours with entries
    pub activity_by_hour: BTreeMap<u32, u64>,
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<AuditLog>>;

    /// Filtered page, newest first
    async fn list(&self, filter: &AuditLogFilter, page: PageRequest)
        -> RepoResult<(Vec<AuditLog>, u64)>;

    /// Every entry for one record, oldest first
    async fn history(&self, table_name: &str, record_id: i64) -> RepoResult<Vec<AuditLog>>;

    /// Totals inside `window`. The hourly breakdown uses `hourly`, which may be narrower.
    async fn statistics(
        &self,
        window: AuditWindow,
        hourly: AuditWindow,
        top_users: i64,
    ) -> RepoResult<AuditStatistics>;

    /// Entries written by one user inside `window`, newest first
    async fn user_activity(
        &self,
        user_id: i64,
        window: AuditWindow,
        limit: i64,
    ) -> RepoResult<Vec<AuditLog>>;

    /// Undo the change recorded by `log_id` and record the compensating entry
    async fn rollback(
        &self,
        log_id: i64,
        actor: i64,
        reason: Option<String>,
    ) -> RepoResult<RollbackOutcome>;
}

// ============================================================================
// Query Repository (read-only SQL tool)
// ============================================================================

/// Rows of an ad-hoc query, positional per column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

#[async_trait]
pub trait QueryRepository: Send + Sync {
    /// Run one SELECT inside a read-only transaction, returning at most `max_rows` rows
    async fn run_read_only(
        &self,
        sql: &str,
        max_rows: u32,
        statement_timeout_ms: u64,
    ) -> RepoResult<QueryOutput>;

    /// Columns of public tables, optionally restricted to one table
    async fn describe_tables(&self, table: Option<&str>) -> RepoResult<Vec<TableSchema>>;
}
