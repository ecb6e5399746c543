//! MCP tool handlers

use axum::{extract::State, Json};
use migtrack_service::dto::{
    McpQueryRequest, McpSchemaQuery, McpToolsResponse, QueryResultResponse, SchemaResponse,
};
use migtrack_service::services::McpService;

use crate::extractors::{AuthUser, QueryParams, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /mcp/tools
pub async fn list_tools(State(state): State<AppState>, _auth: AuthUser) -> Json<McpToolsResponse> {
    Json(McpService::new(state.service_context()).tools())
}

/// GET /mcp/schema
pub async fn get_schema(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<McpSchemaQuery>,
) -> ApiResult<Json<SchemaResponse>> {
    let service = McpService::new(state.service_context());
    let response = service
        .schema(auth.user_id, query.table_name.as_deref())
        .await?;
    Ok(Json(response))
}

/// POST /mcp/query
pub async fn run_query(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<McpQueryRequest>,
) -> ApiResult<Json<QueryResultResponse>> {
    let service = McpService::new(state.service_context());
    let response = service.execute(auth.user_id, request).await?;
    Ok(Json(response))
}
