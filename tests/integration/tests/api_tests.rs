//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variables: DATABASE_URL (JWT_SECRET optional)
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use chrono::{Duration, Utc};
use migtrack_core::UserRole;
use reqwest::StatusCode;
use serde_json::json;

async fn create_application(server: &TestServer, token: &str) -> ApplicationResponse {
    let response = server
        .post_auth("/applications", token, &CreateApplicationRequest::unique())
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn create_announcement(server: &TestServer, title: &str) -> AnnouncementResponse {
    let body = json!({
        "title": title,
        "content": "Scheduled maintenance",
        "priority": "medium",
        "status": "published",
    });
    let response = server
        .post_auth("/announcements", &server.admin.token, &body)
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn history(server: &TestServer, table: &str, id: i64) -> RecordHistory {
    let response = server
        .get_auth(
            &format!("/audit-logs/records/{table}/{id}"),
            &server.admin.token,
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "healthy");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let auth = server.register(&request).await.unwrap();

    assert_eq!(auth.user.username, request.username);
    assert_eq!(auth.user.role, "viewer");
    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();
    server.register(&request).await.unwrap();

    let duplicate = RegisterRequest {
        email: RegisterRequest::unique().email,
        ..request
    };
    let response = server.post("/auth/register", &duplicate).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_register_weak_password() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::with_password("alllowercase1");

    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();
    server.register(&request).await.unwrap();

    let login = LoginRequest::new(&request.username, &request.password);
    let response = server.post("/auth/login", &login).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(auth.user.username, request.username);
    assert!(auth.expires_in > 0);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();
    server.register(&request).await.unwrap();

    let login = LoginRequest::new(&request.username, "WrongPass999");
    let response = server.post("/auth/login", &login).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let auth = server.register(&RegisterRequest::unique()).await.unwrap();

    let body = json!({ "refresh_token": auth.refresh_token });
    let response = server.post("/auth/refresh", &body).await.unwrap();
    let refreshed: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(refreshed.user.id, auth.user.id);

    // An access token is not a refresh token
    let body = json!({ "refresh_token": auth.access_token });
    let response = server.post("/auth/refresh", &body).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_me_requires_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/users/me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.get_auth("/users/me", "not-a-jwt").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.get_auth("/users/me", &server.admin.token).await.unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, server.admin.user_id);
    assert_eq!(me.role, "admin");
}

// ============================================================================
// User & Menu Tests
// ============================================================================

#[tokio::test]
async fn test_admin_changes_role() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let editor = server.user_with_role(UserRole::Editor).await.unwrap();

    let response = server.get_auth("/users/me", &editor.token).await.unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.role, "editor");

    // Only admins manage access
    let response = server
        .patch_auth(
            &format!("/users/{}", editor.user_id),
            &editor.token,
            &json!({ "role": "admin" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .patch_auth(
            &format!("/users/{}", server.admin.user_id),
            &server.admin.token,
            &json!({ "role": "viewer" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_menu_by_role() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_auth("/menu", &server.admin.token).await.unwrap();
    let menu: MenuResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(menu.user_role, "admin");
    assert_eq!(
        menu.group_ids(),
        vec!["common", "data-management", "system-management", "tools"]
    );

    let viewer = server.user_with_role(UserRole::Viewer).await.unwrap();
    let response = server.get_auth("/menu", &viewer.token).await.unwrap();
    let menu: MenuResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(menu.user_role, "viewer");
    assert_eq!(menu.group_ids(), vec!["common", "tools"]);
    assert!(menu.menu_groups[0].items.iter().all(|i| i.id != "my-tasks"));
}

// ============================================================================
// Application Tests
// ============================================================================

#[tokio::test]
async fn test_application_crud() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let editor = server.user_with_role(UserRole::Editor).await.unwrap();

    let app = create_application(&server, &editor.token).await;
    assert_eq!(app.overall_status, "not_started");
    assert_eq!(app.progress_percentage, 0);

    let response = server
        .patch_auth(
            &format!("/applications/{}", app.id),
            &editor.token,
            &json!({ "notes": "kickoff done" }),
        )
        .await
        .unwrap();
    let updated: ApplicationResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.notes.as_deref(), Some("kickoff done"));

    // Editors may not delete
    let response = server
        .delete_auth(&format!("/applications/{}", app.id), &editor.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .delete_auth(&format!("/applications/{}", app.id), &server.admin.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth(&format!("/applications/{}", app.id), &editor.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_viewer_cannot_create_application() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let viewer = server.user_with_role(UserRole::Viewer).await.unwrap();

    let response = server
        .post_auth("/applications", &viewer.token, &CreateApplicationRequest::unique())
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_l2_id_conflicts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = CreateApplicationRequest::unique();

    let response = server
        .post_auth("/applications", &server.admin.token, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth("/applications", &server.admin.token, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_application_pagination() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    for _ in 0..3 {
        create_application(&server, &server.admin.token).await;
    }

    let response = server
        .get_auth("/applications?page=1&page_size=2", &server.admin.token)
        .await
        .unwrap();
    let page: Page<ApplicationResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 2);
    assert_eq!(page.items.len(), 2);
    assert!(page.total >= 3);
    assert_eq!(u64::from(page.total_pages), page.total.div_ceil(2));
}

#[tokio::test]
async fn test_invalid_pagination_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    for query in ["page=0", "page_size=0", "page_size=101", "page=abc"] {
        let response = server
            .get_auth(&format!("/applications?{query}"), &server.admin.token)
            .await
            .unwrap();
        let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(code, "INVALID_QUERY_PARAMETER", "{query}");
    }
}

// ============================================================================
// SubTask Tests
// ============================================================================

#[tokio::test]
async fn test_subtask_status_sets_progress() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;

    let response = server
        .post_auth(
            "/subtasks",
            &server.admin.token,
            &CreateSubTaskRequest::for_application(app.id),
        )
        .await
        .unwrap();
    let subtask: SubTaskResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(subtask.task_status, "not_started");
    assert_eq!(subtask.progress_percentage, 0);

    let response = server
        .patch_auth(
            &format!("/subtasks/{}", subtask.id),
            &server.admin.token,
            &json!({ "task_status": "testing" }),
        )
        .await
        .unwrap();
    let subtask: SubTaskResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(subtask.progress_percentage, 60);

    let response = server
        .patch_auth(
            &format!("/subtasks/{}", subtask.id),
            &server.admin.token,
            &json!({ "task_status": "completed" }),
        )
        .await
        .unwrap();
    let subtask: SubTaskResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(subtask.progress_percentage, 100);
    assert!(subtask.is_completed);

    // The parent follows its only subtask
    let response = server
        .get_auth(&format!("/applications/{}", app.id), &server.admin.token)
        .await
        .unwrap();
    let app: ApplicationResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(app.progress_percentage, 100);
}

#[tokio::test]
async fn test_subtask_unknown_application() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post_auth(
            "/subtasks",
            &server.admin.token,
            &CreateSubTaskRequest::for_application(i64::MAX),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Task Assignment & Notification Tests
// ============================================================================

#[tokio::test]
async fn test_task_lifecycle_notifies() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let editor = server.user_with_role(UserRole::Editor).await.unwrap();
    let app = create_application(&server, &server.admin.token).await;

    let response = server
        .post_auth(
            "/task-assignments",
            &server.admin.token,
            &CreateTaskAssignmentRequest::new(app.id, editor.user_id),
        )
        .await
        .unwrap();
    let task: TaskAssignmentResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(task.status, "pending");
    assert_eq!(task.assigned_by_user_id, server.admin.user_id);

    let response = server
        .get_auth("/notifications/unread-count", &editor.token)
        .await
        .unwrap();
    let unread: UnreadCount = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.count, 1);

    let response = server
        .get_auth("/task-assignments/my", &editor.token)
        .await
        .unwrap();
    let mine: Vec<TaskAssignmentResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(mine.iter().any(|t| t.id == task.id));

    let response = server
        .post_auth(
            &format!("/task-assignments/{}/complete", task.id),
            &editor.token,
            &json!({}),
        )
        .await
        .unwrap();
    let task: TaskAssignmentResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(task.status, "completed");
    assert!(task.completed_at.is_some());

    // The assigner hears about the completion
    let response = server
        .get_auth("/notifications?unread_only=true", &server.admin.token)
        .await
        .unwrap();
    let page: Page<NotificationResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    let done = page
        .items
        .iter()
        .find(|n| n.title.starts_with("Task completed"))
        .expect("completion notification");
    assert_eq!(done.notification_type, "success");

    let response = server
        .post_auth("/notifications/read-all", &server.admin.token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth("/notifications/unread-count", &server.admin.token)
        .await
        .unwrap();
    let unread: UnreadCount = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.count, 0);
}

#[tokio::test]
async fn test_unrelated_user_cannot_complete_task() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let assignee = server.user_with_role(UserRole::Editor).await.unwrap();
    let other = server.user_with_role(UserRole::Editor).await.unwrap();
    let app = create_application(&server, &server.admin.token).await;

    let response = server
        .post_auth(
            "/task-assignments",
            &server.admin.token,
            &CreateTaskAssignmentRequest::new(app.id, assignee.user_id),
        )
        .await
        .unwrap();
    let task: TaskAssignmentResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth(
            &format!("/task-assignments/{}/complete", task.id),
            &other.token,
            &json!({}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Announcement Tests
// ============================================================================

#[tokio::test]
async fn test_announcements_active_and_pinned() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let viewer = server.user_with_role(UserRole::Viewer).await.unwrap();
    let announcement = create_announcement(&server, "Freeze window").await;
    assert!(announcement.is_active);
    assert!(!announcement.is_pinned);

    let response = server
        .post_auth(
            &format!("/announcements/{}/pin", announcement.id),
            &server.admin.token,
            &json!({ "is_pinned": true }),
        )
        .await
        .unwrap();
    let pinned: AnnouncementResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(pinned.is_pinned);

    let response = server
        .get_auth("/announcements/pinned?limit=100", &viewer.token)
        .await
        .unwrap();
    let list: Vec<AnnouncementResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(list.iter().any(|a| a.id == announcement.id));

    let response = server
        .get_auth("/announcements/active?limit=100", &viewer.token)
        .await
        .unwrap();
    let list: Vec<AnnouncementResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(list.iter().all(|a| a.is_active));

    // Viewers read but never write
    let response = server
        .delete_auth(&format!("/announcements/{}", announcement.id), &viewer.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_announcement_window_validated() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let body = json!({
        "title": "Backwards",
        "content": "Expires before it starts",
        "publish_date": "2030-01-02T00:00:00Z",
        "expire_date": "2030-01-01T00:00:00Z",
    });
    let response = server
        .post_auth("/announcements", &server.admin.token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Audit & Rollback Tests
// ============================================================================

#[tokio::test]
async fn test_writes_are_audited() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;

    let response = server
        .patch_auth(
            &format!("/applications/{}", app.id),
            &server.admin.token,
            &json!({ "responsible_team": "platform" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let history = history(&server, "applications", app.id).await;
    assert_eq!(history.total_operations, 2);
    assert_eq!(history.history[0].operation, "CREATE");
    assert_eq!(history.history[1].operation, "UPDATE");
    assert!(history.history[1]
        .changed_fields
        .contains(&"responsible_team".to_string()));

    let response = server
        .get_auth(
            &format!("/audit-logs?table_name=applications&record_id={}", app.id),
            &server.admin.token,
        )
        .await
        .unwrap();
    let page: Page<AuditLogResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].operation, "UPDATE", "newest first");
}

#[tokio::test]
async fn test_audit_requires_manager() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let editor = server.user_with_role(UserRole::Editor).await.unwrap();

    let response = server.get_auth("/audit-logs", &editor.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_rollback_requires_confirm() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    // Rejected before the entry is even looked up
    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", i64::MAX),
            &server.admin.token,
            &json!({ "reason": "oops" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_rollback_unknown_log() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", i64::MAX),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_rollback_update_restores_values() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let announcement = create_announcement(&server, "Original title").await;

    let response = server
        .patch_auth(
            &format!("/announcements/{}", announcement.id),
            &server.admin.token,
            &json!({ "title": "Edited title" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let update = history(&server, "announcements", announcement.id)
        .await
        .history
        .into_iter()
        .find(|e| e.operation == "UPDATE")
        .expect("update entry");

    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", update.id),
            &server.admin.token,
            &json!({ "confirm": true, "reason": "wrong title" }),
        )
        .await
        .unwrap();
    let rollback: RollbackResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rollback.status, "success");
    assert_eq!(rollback.affected_record.table, "announcements");
    assert_eq!(rollback.affected_record.id, announcement.id);
    assert_eq!(rollback.affected_record.operation, "UPDATE");
    assert_eq!(
        rollback.restored_record.as_ref().unwrap()["title"],
        "Original title"
    );

    let response = server
        .get_auth(
            &format!("/audit-logs/{}", rollback.rollback_audit_id),
            &server.admin.token,
        )
        .await
        .unwrap();
    let entry: AuditLogResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(entry.operation, "ROLLBACK");
    assert_eq!(entry.rollback_of, Some(update.id));

    // The rollback itself is a later change, so the same entry can't be undone twice
    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", update.id),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_rollback_after_later_change_conflicts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;

    for notes in ["first", "second"] {
        let response = server
            .patch_auth(
                &format!("/applications/{}", app.id),
                &server.admin.token,
                &json!({ "notes": notes }),
            )
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    let first_update = history(&server, "applications", app.id).await.history[1].clone();
    assert_eq!(first_update.operation, "UPDATE");

    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", first_update.id),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "RECORD_MODIFIED");
}

#[tokio::test]
async fn test_rollback_delete_restores_row() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let announcement = create_announcement(&server, "Deleted by mistake").await;

    let response = server
        .delete_auth(
            &format!("/announcements/{}", announcement.id),
            &server.admin.token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let delete = history(&server, "announcements", announcement.id)
        .await
        .history
        .into_iter()
        .find(|e| e.operation == "DELETE")
        .expect("delete entry");

    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", delete.id),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    let rollback: RollbackResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rollback.affected_record.operation, "DELETE");

    let response = server
        .get_auth(
            &format!("/announcements/{}", announcement.id),
            &server.admin.token,
        )
        .await
        .unwrap();
    let restored: AnnouncementResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(restored.title, "Deleted by mistake");
}

#[tokio::test]
async fn test_rollback_create_removes_row() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;

    let create = history(&server, "applications", app.id).await.history[0].clone();
    assert_eq!(create.operation, "CREATE");

    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", create.id),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    let rollback: RollbackResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rollback.affected_record.operation, "CREATE");
    assert!(rollback.restored_record.is_none());

    let response = server
        .get_auth(&format!("/applications/{}", app.id), &server.admin.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get_auth(
            &format!("/audit-logs/{}", rollback.rollback_audit_id),
            &server.admin.token,
        )
        .await
        .unwrap();
    let entry: AuditLogResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(entry.operation, "ROLLBACK");
    assert_eq!(entry.rollback_of, Some(create.id));
    assert!(entry.new_values.is_none());
    let removed = entry.old_values.expect("deleted row snapshot");
    assert_eq!(removed["id"], json!(app.id));
    assert_eq!(removed["l2_id"], json!(app.l2_id));

    // A rollback entry is never itself undoable
    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", rollback.rollback_audit_id),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "NOT_RESTORABLE");
}

#[tokio::test]
async fn test_rollback_to_taken_l2_id_conflicts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;
    let original_l2 = app.l2_id.clone();

    let response = server
        .patch_auth(
            &format!("/applications/{}", app.id),
            &server.admin.token,
            &json!({ "l2_id": format!("{original_l2}-moved") }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    let update = history(&server, "applications", app.id).await.history[1].clone();

    let mut taken = CreateApplicationRequest::unique();
    taken.l2_id = original_l2;
    let response = server
        .post_auth("/applications", &server.admin.token, &taken)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth(
            &format!("/audit-logs/{}/rollback", update.id),
            &server.admin.token,
            &json!({ "confirm": true }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "L2_ID_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_history_of_unaudited_table() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .get_auth("/audit-logs/records/users/1", &server.admin.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_record_change_summary() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;

    for body in [
        json!({ "notes": "first pass" }),
        json!({ "notes": "second pass" }),
        json!({ "app_name": "Renamed" }),
    ] {
        let response = server
            .patch_auth(&format!("/applications/{}", app.id), &server.admin.token, &body)
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    let response = server
        .get_auth(
            &format!("/audit-logs/records/applications/{}/summary", app.id),
            &server.admin.token,
        )
        .await
        .unwrap();
    let summary: ChangeSummaryResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(summary.record_id, app.id);
    assert_eq!(summary.total_operations, 4);
    assert_eq!(summary.total_changes, 3);
    assert_eq!(summary.created_by, Some(server.admin.user_id));
    assert_eq!(summary.last_modified_by, Some(server.admin.user_id));
    assert_eq!(summary.operations_breakdown["CREATE"], 1);
    assert_eq!(summary.operations_breakdown["UPDATE"], 3);
    assert_eq!(summary.operations_breakdown["DELETE"], 0);
    assert_eq!(summary.field_changes["notes"], 2);
    assert_eq!(summary.most_changed_fields[0].field, "notes");
    assert_eq!(summary.most_changed_fields[0].count, 2);

    let response = server
        .get_auth("/audit-logs/records/users/1/summary", &server.admin.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_user_activity() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let editor = server.user_with_role(UserRole::Editor).await.unwrap();
    let app = create_application(&server, &editor.token).await;
    let response = server
        .patch_auth(
            &format!("/applications/{}", app.id),
            &editor.token,
            &json!({ "notes": "edited" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let path = format!("/audit-logs/users/{}/activity", editor.user_id);
    let response = server.get_auth(&path, &server.admin.token).await.unwrap();
    let activity: UserActivityResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(activity.user_id, editor.user_id);
    assert_eq!(activity.total_operations, 2);
    assert_eq!(activity.operations_breakdown["CREATE"], 1);
    assert_eq!(activity.operations_breakdown["UPDATE"], 1);
    assert_eq!(activity.tables_affected, vec!["applications".to_string()]);
    assert_eq!(activity.recent_activity[0].operation, "UPDATE", "newest first");

    let response = server
        .get_auth(&format!("{path}?limit=1"), &server.admin.token)
        .await
        .unwrap();
    let activity: UserActivityResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(activity.recent_activity.len(), 1);

    // Managers only
    let response = server.get_auth(&path, &editor.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .get_auth("/audit-logs/users/999999999/activity", &server.admin.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_audit_statistics() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    create_application(&server, &server.admin.token).await;

    let today = Utc::now().date_naive();
    let start = today - Duration::days(1);
    let end = today + Duration::days(1);
    let response = server
        .get_auth(
            &format!("/audit-logs/statistics?start_date={start}&end_date={end}"),
            &server.admin.token,
        )
        .await
        .unwrap();
    let stats: AuditStatisticsResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(stats.total_logs >= 1);
    assert!(stats.by_operation["CREATE"] >= 1);
    assert!(stats.by_table["applications"] >= 1);
    assert!(!stats.top_users.is_empty());
    assert!(stats.top_users.windows(2).all(|w| w[0].count >= w[1].count));
    assert!(stats.activity_by_hour.keys().all(|hour| *hour < 24));

    let response = server
        .get_auth(
            &format!("/audit-logs/statistics?start_date={end}&end_date={start}"),
            &server.admin.token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Dashboard Tests
// ============================================================================

#[tokio::test]
async fn test_dashboard_stats_by_team() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let app = create_application(&server, &server.admin.token).await;

    let response = server
        .post_auth(
            "/subtasks",
            &server.admin.token,
            &CreateSubTaskRequest::for_application(app.id),
        )
        .await
        .unwrap();
    let subtask: SubTaskResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let response = server
        .patch_auth(
            &format!("/subtasks/{}", subtask.id),
            &server.admin.token,
            &json!({ "task_status": "completed" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Visible to every role
    let viewer = server.user_with_role(UserRole::Viewer).await.unwrap();
    let response = server
        .get_auth(
            &format!("/dashboard/stats?team={}&period=week", app.responsible_team),
            &viewer.token,
        )
        .await
        .unwrap();
    let stats: DashboardStatsResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stats.total_applications, 1);
    assert_eq!(stats.completed_applications, 1);
    assert_eq!(stats.ak_target_applications, 1);
    assert_eq!(stats.ak_completion_rate, 100.0);
    assert_eq!(stats.cloud_native_completion_rate, 0.0);
    assert_eq!(stats.average_progress, 100.0);

    let response = server
        .get_auth("/dashboard/stats?period=decade", &viewer.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// MCP Tests
// ============================================================================

#[tokio::test]
async fn test_mcp_query() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let viewer = server.user_with_role(UserRole::Viewer).await.unwrap();

    let body = json!({ "query": "SELECT 1 AS one, 'x' AS label -- trailing comment" });
    let response = server.post_auth("/mcp/query", &viewer.token, &body).await.unwrap();
    let result: QueryResultResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(result.columns, vec!["one", "label"]);
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0][0], 1);
    assert_eq!(result.rows[0][1], "x");
}

#[tokio::test]
async fn test_mcp_query_keeps_duplicate_columns_and_literals() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let body = json!({ "query": "SELECT 1 AS id, 2 AS id, '-- not a comment' AS note" });
    let response = server
        .post_auth("/mcp/query", &server.admin.token, &body)
        .await
        .unwrap();
    let result: QueryResultResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(result.columns, vec!["id", "id", "note"]);
    assert_eq!(result.rows[0], vec![json!(1), json!(2), json!("-- not a comment")]);
}

#[tokio::test]
async fn test_mcp_query_limit() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let body = json!({ "query": "SELECT g FROM generate_series(1, 50) AS g", "limit": 5 });
    let response = server
        .post_auth("/mcp/query", &server.admin.token, &body)
        .await
        .unwrap();
    let result: QueryResultResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.row_count, 5);
}

#[tokio::test]
async fn test_mcp_rejects_unsafe_query() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    for query in [
        "DELETE FROM applications",
        "SELECT 1; DROP TABLE users",
        "select * from users where name = 'x' or 1=1 union select 1 from t; update users set role='admin'",
    ] {
        let response = server
            .post_auth("/mcp/query", &server.admin.token, &json!({ "query": query }))
            .await
            .unwrap();
        let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(code, "UNSAFE_QUERY", "{query}");
    }
}

#[tokio::test]
async fn test_mcp_tools_and_schema() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_auth("/mcp/tools", &server.admin.token).await.unwrap();
    let tools: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    let names: Vec<&str> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["db_query", "db_get_schema"]);

    let response = server
        .get_auth("/mcp/schema?table_name=applications", &server.admin.token)
        .await
        .unwrap();
    let schema: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    let tables = schema["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["name"], "applications");
}
