//! Notification handlers. Callers only ever touch their own notifications.

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{
    MarkAllReadResponse, NotificationListQuery, NotificationResponse, UnreadCountResponse,
};
use migtrack_service::services::NotificationService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
    QueryParams(query): QueryParams<NotificationListQuery>,
) -> ApiResult<Json<Page<NotificationResponse>>> {
    let service = NotificationService::new(state.service_context());
    let response = service
        .list_notifications(auth.user_id, query.unread_only, page)
        .await?;
    Ok(Json(response))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.service_context());
    let response = service.unread_count(auth.user_id).await?;
    Ok(Json(response))
}

/// POST /notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(notification_id): IdPath<i64>,
) -> ApiResult<Json<NotificationResponse>> {
    let service = NotificationService::new(state.service_context());
    let response = service.mark_read(auth.user_id, notification_id).await?;
    Ok(Json(response))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let service = NotificationService::new(state.service_context());
    let response = service.mark_all_read(auth.user_id).await?;
    Ok(Json(response))
}
