//! Announcement handlers

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{
    ActiveAnnouncementsQuery, AnnouncementListQuery, AnnouncementResponse,
    CreateAnnouncementRequest, PinAnnouncementRequest, UpdateAnnouncementRequest,
};
use migtrack_service::services::AnnouncementService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /announcements
pub async fn list_announcements(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
    QueryParams(query): QueryParams<AnnouncementListQuery>,
) -> ApiResult<Json<Page<AnnouncementResponse>>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service.list_announcements(auth.user_id, query, page).await?;
    Ok(Json(response))
}

/// POST /announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateAnnouncementRequest>,
) -> ApiResult<Created<Json<AnnouncementResponse>>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service.create_announcement(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// GET /announcements/active
pub async fn active_announcements(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ActiveAnnouncementsQuery>,
) -> ApiResult<Json<Vec<AnnouncementResponse>>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service.active_announcements(auth.user_id, query.limit).await?;
    Ok(Json(response))
}

/// GET /announcements/pinned
pub async fn pinned_announcements(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ActiveAnnouncementsQuery>,
) -> ApiResult<Json<Vec<AnnouncementResponse>>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service.pinned_announcements(auth.user_id, query.limit).await?;
    Ok(Json(response))
}

/// GET /announcements/:id
pub async fn get_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(announcement_id): IdPath<i64>,
) -> ApiResult<Json<AnnouncementResponse>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service.get_announcement(auth.user_id, announcement_id).await?;
    Ok(Json(response))
}

/// PATCH /announcements/:id
pub async fn update_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(announcement_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateAnnouncementRequest>,
) -> ApiResult<Json<AnnouncementResponse>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service
        .update_announcement(auth.user_id, announcement_id, request)
        .await?;
    Ok(Json(response))
}

/// DELETE /announcements/:id
pub async fn delete_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(announcement_id): IdPath<i64>,
) -> ApiResult<NoContent> {
    let service = AnnouncementService::new(state.service_context());
    service.delete_announcement(auth.user_id, announcement_id).await?;
    Ok(NoContent)
}

/// POST /announcements/:id/pin
pub async fn pin_announcement(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(announcement_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<PinAnnouncementRequest>,
) -> ApiResult<Json<AnnouncementResponse>> {
    let service = AnnouncementService::new(state.service_context());
    let response = service
        .pin_announcement(auth.user_id, announcement_id, request.is_pinned)
        .await?;
    Ok(Json(response))
}
