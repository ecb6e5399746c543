//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    ActiveAnnouncementsQuery, AnnouncementListQuery, ApplicationListQuery, AuditLogListQuery,
    AuditStatisticsQuery, CreateAnnouncementRequest, CreateApplicationRequest,
    CreateSubTaskRequest, CreateTaskAssignmentRequest, DashboardPeriod, DashboardQuery,
    LoginRequest, McpQueryRequest, McpSchemaQuery, MyTasksQuery, NotificationListQuery,
    PinAnnouncementRequest, RefreshTokenRequest, RegisterRequest, RollbackRequest,
    SubTaskListQuery, TaskAssignmentListQuery, UpdateAnnouncementRequest,
    UpdateApplicationRequest, UpdateSubTaskRequest, UpdateTaskAssignmentRequest,
    UpdateUserAccessRequest, UserActivityQuery,
};

// Re-export commonly used response types
pub use responses::{
    AffectedRecord, AnnouncementResponse, ApplicationResponse, AuditLogResponse,
    AuditStatisticsResponse, AuthResponse, ChangeSummaryResponse, DashboardStatsResponse,
    FieldChangeCount, HealthChecks, HealthResponse, MarkAllReadResponse, McpTool,
    McpToolsResponse, MenuGroup, MenuItem, MenuResponse, NotificationResponse,
    QueryResultResponse, ReadinessResponse, RecordHistoryResponse, RollbackResponse,
    SchemaResponse, SubTaskResponse, TaskAssignmentResponse, UnreadCountResponse,
    UserActivityResponse, UserResponse,
};
