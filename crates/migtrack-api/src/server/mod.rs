//! Server setup and initialization
//!
//! Wires the pool, repositories and services together and runs the HTTP server.

use std::sync::Arc;

use axum::Router;
use migtrack_common::{AppConfig, AppError, JwtService};
use migtrack_db::{
    create_pool, run_migrations, DatabaseConfig, PgAnnouncementRepository,
    PgApplicationRepository, PgAuditLogRepository, PgNotificationRepository, PgQueryRepository,
    PgSubTaskRepository, PgTaskAssignmentRepository, PgUserRepository,
};
use migtrack_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware.
///
/// Health checks get the plain stack; everything under `/api/v1` is also
/// rate limited and CORS-filtered.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;
    }

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));

    let service_context = ServiceContextBuilder::new()
        .pool(pool.clone())
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .application_repo(Arc::new(PgApplicationRepository::new(pool.clone())))
        .subtask_repo(Arc::new(PgSubTaskRepository::new(pool.clone())))
        .task_assignment_repo(Arc::new(PgTaskAssignmentRepository::new(pool.clone())))
        .announcement_repo(Arc::new(PgAnnouncementRepository::new(pool.clone())))
        .notification_repo(Arc::new(PgNotificationRepository::new(pool.clone())))
        .audit_log_repo(Arc::new(PgAuditLogRepository::new(pool.clone())))
        .query_repo(Arc::new(PgQueryRepository::new(pool)))
        .jwt_service(jwt_service)
        .auth_config(config.auth.clone())
        .mcp_config(config.mcp.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Serve `app` on `addr` until Ctrl-C
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;
    run_server(app, &addr).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
