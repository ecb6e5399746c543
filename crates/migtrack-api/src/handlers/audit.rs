//! Audit log handlers
//!
//! Browsing the trail and the rollback endpoint.

use axum::{extract::State, Json};
use migtrack_core::Page;
use migtrack_service::dto::{
    AuditLogListQuery, AuditLogResponse, AuditStatisticsQuery, AuditStatisticsResponse,
    ChangeSummaryResponse, RecordHistoryResponse, RollbackRequest, RollbackResponse,
    UserActivityQuery, UserActivityResponse,
};
use migtrack_service::services::AuditService;

use crate::extractors::{AuthUser, IdPath, Pagination, QueryParams, RecordPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
    QueryParams(query): QueryParams<AuditLogListQuery>,
) -> ApiResult<Json<Page<AuditLogResponse>>> {
    let service = AuditService::new(state.service_context());
    let response = service.list_logs(auth.user_id, query, page).await?;
    Ok(Json(response))
}

/// GET /audit-logs/:id
pub async fn get_audit_log(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(log_id): IdPath<i64>,
) -> ApiResult<Json<AuditLogResponse>> {
    let service = AuditService::new(state.service_context());
    let response = service.get_log(auth.user_id, log_id).await?;
    Ok(Json(response))
}

/// GET /audit-logs/records/:table_name/:record_id
pub async fn record_history(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(path): IdPath<RecordPath>,
) -> ApiResult<Json<RecordHistoryResponse>> {
    let service = AuditService::new(state.service_context());
    let response = service
        .record_history(auth.user_id, &path.table_name, path.record_id)
        .await?;
    Ok(Json(response))
}

/// GET /audit-logs/records/:table_name/:record_id/summary
pub async fn record_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(path): IdPath<RecordPath>,
) -> ApiResult<Json<ChangeSummaryResponse>> {
    let service = AuditService::new(state.service_context());
    let response = service
        .record_summary(auth.user_id, &path.table_name, path.record_id)
        .await?;
    Ok(Json(response))
}

/// GET /audit-logs/statistics
pub async fn statistics(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<AuditStatisticsQuery>,
) -> ApiResult<Json<AuditStatisticsResponse>> {
    let service = AuditService::new(state.service_context());
    let response = service.statistics(auth.user_id, query).await?;
    Ok(Json(response))
}

/// GET /audit-logs/users/:id/activity
pub async fn user_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(target_user_id): IdPath<i64>,
    QueryParams(query): QueryParams<UserActivityQuery>,
) -> ApiResult<Json<UserActivityResponse>> {
    let service = AuditService::new(state.service_context());
    let response = service
        .user_activity(auth.user_id, target_user_id, query)
        .await?;
    Ok(Json(response))
}

/// Undo the change recorded by one audit entry
///
/// POST /audit-logs/:id/rollback
pub async fn rollback(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(log_id): IdPath<i64>,
    ValidatedJson(request): ValidatedJson<RollbackRequest>,
) -> ApiResult<Json<RollbackResponse>> {
    let service = AuditService::new(state.service_context());
    let response = service.rollback(auth.user_id, log_id, request).await?;
    Ok(Json(response))
}
