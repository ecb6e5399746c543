//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    announcements, applications, audit, auth, dashboard, health, mcp, menu, notifications,
    subtasks, task_assignments, users,
};
use crate::state::AppState;

/// API router (health routes are separate so they skip rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(application_routes())
        .merge(subtask_routes())
        .merge(task_assignment_routes())
        .merge(announcement_routes())
        .merge(notification_routes())
        .merge(audit_routes())
        .merge(mcp_routes())
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route("/menu", get(menu::get_menu))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", get(auth::me))
        .route(
            "/users/:id",
            get(users::get_user).patch(users::update_user_access),
        )
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/applications/:id",
            get(applications::get_application)
                .patch(applications::update_application)
                .delete(applications::delete_application),
        )
        .route(
            "/applications/:id/subtasks",
            get(applications::list_application_subtasks),
        )
}

fn subtask_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subtasks",
            get(subtasks::list_subtasks).post(subtasks::create_subtask),
        )
        .route(
            "/subtasks/:id",
            get(subtasks::get_subtask)
                .patch(subtasks::update_subtask)
                .delete(subtasks::delete_subtask),
        )
}

fn task_assignment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/task-assignments",
            get(task_assignments::list_tasks).post(task_assignments::create_task),
        )
        .route("/task-assignments/my", get(task_assignments::my_tasks))
        .route(
            "/task-assignments/:id",
            get(task_assignments::get_task)
                .patch(task_assignments::update_task)
                .delete(task_assignments::delete_task),
        )
        .route(
            "/task-assignments/:id/complete",
            post(task_assignments::complete_task),
        )
}

fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route("/announcements/active", get(announcements::active_announcements))
        .route("/announcements/pinned", get(announcements::pinned_announcements))
        .route(
            "/announcements/:id",
            get(announcements::get_announcement)
                .patch(announcements::update_announcement)
                .delete(announcements::delete_announcement),
        )
        .route("/announcements/:id/pin", post(announcements::pin_announcement))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id/read", post(notifications::mark_read))
}

fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(audit::list_audit_logs))
        .route("/audit-logs/statistics", get(audit::statistics))
        .route("/audit-logs/users/:id/activity", get(audit::user_activity))
        .route(
            "/audit-logs/records/:table_name/:record_id",
            get(audit::record_history),
        )
        .route(
            "/audit-logs/records/:table_name/:record_id/summary",
            get(audit::record_summary),
        )
        .route("/audit-logs/:id", get(audit::get_audit_log))
        .route("/audit-logs/:id/rollback", post(audit::rollback))
}

fn mcp_routes() -> Router<AppState> {
    Router::new()
        .route("/mcp/tools", get(mcp::list_tools))
        .route("/mcp/schema", get(mcp::get_schema))
        .route("/mcp/query", post(mcp::run_query))
}
