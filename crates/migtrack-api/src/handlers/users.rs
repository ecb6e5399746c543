//! User administration handlers

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{UpdateUserAccessRequest, UserResponse};
use migtrack_service::services::UserService;

use crate::extractors::{AuthUser, IdPath, Pagination, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<Page<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.list_users(auth.user_id, page).await?;
    Ok(Json(response))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath<i64>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.get_user(auth.user_id, user_id).await?;
    Ok(Json(response))
}

/// Change role or active flag
///
/// PATCH /users/:id
pub async fn update_user_access(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdateUserAccessRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.update_access(auth.user_id, user_id, request).await?;
    Ok(Json(response))
}
