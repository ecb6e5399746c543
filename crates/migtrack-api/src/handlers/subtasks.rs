//! SubTask handlers

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{
    CreateSubTaskRequest, SubTaskListQuery, SubTaskResponse, UpdateSubTaskRequest,
};
use migtrack_service::services::SubTaskService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /subtasks
pub async fn list_subtasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
    QueryParams(query): QueryParams<SubTaskListQuery>,
) -> ApiResult<Json<Page<SubTaskResponse>>> {
    let service = SubTaskService::new(state.service_context());
    let response = service.list_subtasks(auth.user_id, query, page).await?;
    Ok(Json(response))
}

/// POST /subtasks
pub async fn create_subtask(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateSubTaskRequest>,
) -> ApiResult<Created<Json<SubTaskResponse>>> {
    let service = SubTaskService::new(state.service_context());
    let response = service.create_subtask(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// GET /subtasks/:id
pub async fn get_subtask(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(subtask_id): IdPath<i64>,
) -> ApiResult<Json<SubTaskResponse>> {
    let service = SubTaskService::new(state.service_context());
    let response = service.get_subtask(auth.user_id, subtask_id).await?;
    Ok(Json(response))
}

/// PATCH /subtasks/:id
pub async fn update_subtask(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(subtask_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateSubTaskRequest>,
) -> ApiResult<Json<SubTaskResponse>> {
    let service = SubTaskService::new(state.service_context());
    let response = service.update_subtask(auth.user_id, subtask_id, request).await?;
    Ok(Json(response))
}

/// DELETE /subtasks/:id
pub async fn delete_subtask(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(subtask_id): IdPath<i64>,
) -> ApiResult<NoContent> {
    let service = SubTaskService::new(state.service_context());
    service.delete_subtask(auth.user_id, subtask_id).await?;
    Ok(NoContent)
}
