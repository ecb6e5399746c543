//! Application handlers

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{
    ApplicationListQuery, ApplicationResponse, CreateApplicationRequest, SubTaskResponse,
    UpdateApplicationRequest,
};
use migtrack_service::services::ApplicationService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /applications
pub async fn list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
    QueryParams(query): QueryParams<ApplicationListQuery>,
) -> ApiResult<Json<Page<ApplicationResponse>>> {
    let service = ApplicationService::new(state.service_context());
    let response = service.list_applications(auth.user_id, query, page).await?;
    Ok(Json(response))
}

/// POST /applications
pub async fn create_application(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateApplicationRequest>,
) -> ApiResult<Created<Json<ApplicationResponse>>> {
    let service = ApplicationService::new(state.service_context());
    let response = service.create_application(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// GET /applications/:id
pub async fn get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(application_id): IdPath<i64>,
) -> ApiResult<Json<ApplicationResponse>> {
    let service = ApplicationService::new(state.service_context());
    let response = service.get_application(auth.user_id, application_id).await?;
    Ok(Json(response))
}

/// PATCH /applications/:id
pub async fn update_application(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(application_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateApplicationRequest>,
) -> ApiResult<Json<ApplicationResponse>> {
    let service = ApplicationService::new(state.service_context());
    let response = service
        .update_application(auth.user_id, application_id, request)
        .await?;
    Ok(Json(response))
}

/// DELETE /applications/:id
pub async fn delete_application(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(application_id): IdPath<i64>,
) -> ApiResult<NoContent> {
    let service = ApplicationService::new(state.service_context());
    service.delete_application(auth.user_id, application_id).await?;
    Ok(NoContent)
}

/// GET /applications/:id/subtasks
pub async fn list_application_subtasks(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(application_id): IdPath<i64>,
) -> ApiResult<Json<Vec<SubTaskResponse>>> {
    let service = ApplicationService::new(state.service_context());
    let response = service.list_subtasks(auth.user_id, application_id).await?;
    Ok(Json(response))
}
