//! Menu handler

use axum::{extract::State, Json};
use migtrack_service::dto::MenuResponse;
use migtrack_service::services::MenuService;

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /menu
pub async fn get_menu(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MenuResponse>> {
    let service = MenuService::new(state.service_context());
    let response = service.menu(auth.user_id).await?;
    Ok(Json(response))
}
