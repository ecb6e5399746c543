//! Service context - dependency container for services
//!
//! Holds all repositories, settings, and other dependencies needed by services.

use std::sync::Arc;

use migtrack_common::auth::JwtService;
use migtrack_common::{AuthConfig, McpConfig};
use migtrack_core::traits::{
    AnnouncementRepository, ApplicationRepository, AuditLogRepository, NotificationRepository,
    QueryRepository, SubTaskRepository, TaskAssignmentRepository, UserRepository,
};
use migtrack_db::PgPool;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - JWT service for authentication
/// - Account bootstrap and query tool settings
#[derive(Clone)]
pub struct ServiceContext {
    // Database pool
    pool: PgPool,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    application_repo: Arc<dyn ApplicationRepository>,
    subtask_repo: Arc<dyn SubTaskRepository>,
    task_assignment_repo: Arc<dyn TaskAssignmentRepository>,
    announcement_repo: Arc<dyn AnnouncementRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    audit_log_repo: Arc<dyn AuditLogRepository>,
    query_repo: Arc<dyn QueryRepository>,

    // Services
    jwt_service: Arc<JwtService>,

    // Settings
    auth_config: AuthConfig,
    mcp_config: McpConfig,
}

impl ServiceContext {
    // === Database Pool ===

    /// Get the PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the application repository
    pub fn application_repo(&self) -> &dyn ApplicationRepository {
        self.application_repo.as_ref()
    }

    /// Get the subtask repository
    pub fn subtask_repo(&self) -> &dyn SubTaskRepository {
        self.subtask_repo.as_ref()
    }

    /// Get the task assignment repository
    pub fn task_assignment_repo(&self) -> &dyn TaskAssignmentRepository {
        self.task_assignment_repo.as_ref()
    }

    /// Get the announcement repository
    pub fn announcement_repo(&self) -> &dyn AnnouncementRepository {
        self.announcement_repo.as_ref()
    }

    /// Get the notification repository
    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    /// Get the audit log repository
    pub fn audit_log_repo(&self) -> &dyn AuditLogRepository {
        self.audit_log_repo.as_ref()
    }

    /// Get the read-only query repository
    pub fn query_repo(&self) -> &dyn QueryRepository {
        self.query_repo.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    // === Settings ===

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn mcp_config(&self) -> &McpConfig {
        &self.mcp_config
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("repositories", &"...")
            .field("auth_config", &self.auth_config)
            .field("mcp_config", &self.mcp_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    application_repo: Option<Arc<dyn ApplicationRepository>>,
    subtask_repo: Option<Arc<dyn SubTaskRepository>>,
    task_assignment_repo: Option<Arc<dyn TaskAssignmentRepository>>,
    announcement_repo: Option<Arc<dyn AnnouncementRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    audit_log_repo: Option<Arc<dyn AuditLogRepository>>,
    query_repo: Option<Arc<dyn QueryRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    auth_config: Option<AuthConfig>,
    mcp_config: Option<McpConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn application_repo(mut self, repo: Arc<dyn ApplicationRepository>) -> Self {
        self.application_repo = Some(repo);
        self
    }

    pub fn subtask_repo(mut self, repo: Arc<dyn SubTaskRepository>) -> Self {
        self.subtask_repo = Some(repo);
        self
    }

    pub fn task_assignment_repo(mut self, repo: Arc<dyn TaskAssignmentRepository>) -> Self {
        self.task_assignment_repo = Some(repo);
        self
    }

    pub fn announcement_repo(mut self, repo: Arc<dyn AnnouncementRepository>) -> Self {
        self.announcement_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn audit_log_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_log_repo = Some(repo);
        self
    }

    pub fn query_repo(mut self, repo: Arc<dyn QueryRepository>) -> Self {
        self.query_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Defaults to no bootstrap admins
    pub fn auth_config(mut self, config: AuthConfig) -> Self {
        self.auth_config = Some(config);
        self
    }

    /// Defaults to `McpConfig::default()`
    pub fn mcp_config(mut self, config: McpConfig) -> Self {
        self.mcp_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            pool: self.pool.ok_or_else(|| ServiceError::validation("pool is required"))?,
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            application_repo: self
                .application_repo
                .ok_or_else(|| ServiceError::validation("application_repo is required"))?,
            subtask_repo: self
                .subtask_repo
                .ok_or_else(|| ServiceError::validation("subtask_repo is required"))?,
            task_assignment_repo: self
                .task_assignment_repo
                .ok_or_else(|| ServiceError::validation("task_assignment_repo is required"))?,
            announcement_repo: self
                .announcement_repo
                .ok_or_else(|| ServiceError::validation("announcement_repo is required"))?,
            notification_repo: self
                .notification_repo
                .ok_or_else(|| ServiceError::validation("notification_repo is required"))?,
            audit_log_repo: self
                .audit_log_repo
                .ok_or_else(|| ServiceError::validation("audit_log_repo is required"))?,
            query_repo: self
                .query_repo
                .ok_or_else(|| ServiceError::validation("query_repo is required"))?,
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            auth_config: self.auth_config.unwrap_or_default(),
            mcp_config: self.mcp_config.unwrap_or_default(),
        })
    }
}
