//! Task assignment handlers

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{
    CreateTaskAssignmentRequest, MyTasksQuery, TaskAssignmentListQuery, TaskAssignmentResponse,
    UpdateTaskAssignmentRequest,
};
use migtrack_service::services::TaskAssignmentService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /task-assignments
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
    QueryParams(query): QueryParams<TaskAssignmentListQuery>,
) -> ApiResult<Json<Page<TaskAssignmentResponse>>> {
    let service = TaskAssignmentService::new(state.service_context());
    let response = service.list_tasks(auth.user_id, query, page).await?;
    Ok(Json(response))
}

/// POST /task-assignments
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateTaskAssignmentRequest>,
) -> ApiResult<Created<Json<TaskAssignmentResponse>>> {
    let service = TaskAssignmentService::new(state.service_context());
    let response = service.create_task(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// GET /task-assignments/my
pub async fn my_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<MyTasksQuery>,
) -> ApiResult<Json<Vec<TaskAssignmentResponse>>> {
    let service = TaskAssignmentService::new(state.service_context());
    let response = service.my_tasks(auth.user_id, query).await?;
    Ok(Json(response))
}

/// GET /task-assignments/:id
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(task_id): IdPath<i64>,
) -> ApiResult<Json<TaskAssignmentResponse>> {
    let service = TaskAssignmentService::new(state.service_context());
    let response = service.get_task(auth.user_id, task_id).await?;
    Ok(Json(response))
}

/// PATCH /task-assignments/:id
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(task_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateTaskAssignmentRequest>,
) -> ApiResult<Json<TaskAssignmentResponse>> {
    let service = TaskAssignmentService::new(state.service_context());
    let response = service.update_task(auth.user_id, task_id, request).await?;
    Ok(Json(response))
}

/// DELETE /task-assignments/:id
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(task_id): IdPath<i64>,
) -> ApiResult<NoContent> {
    let service = TaskAssignmentService::new(state.service_context());
    service.delete_task(auth.user_id, task_id).await?;
    Ok(NoContent)
}

/// POST /task-assignments/:id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(task_id): IdPath<i64>,
) -> ApiResult<Json<TaskAssignmentResponse>> {
    let service = TaskAssignmentService::new(state.service_context());
    let response = service.complete_task(auth.user_id, task_id).await?;
    Ok(Json(response))
}
