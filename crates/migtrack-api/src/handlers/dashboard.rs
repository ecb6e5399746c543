//! Dashboard handler

use axum::{extract::State, Json};
use migtrack_service::dto::{DashboardQuery, DashboardStatsResponse};
use migtrack_service::services::DashboardService;

use crate::extractors::{AuthUser, QueryParams};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /dashboard/stats
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<DashboardQuery>,
) -> ApiResult<Json<DashboardStatsResponse>> {
    let service = DashboardService::new(state.service_context());
    let response = service.stats(auth.user_id, query).await?;
    Ok(Json(response))
}
