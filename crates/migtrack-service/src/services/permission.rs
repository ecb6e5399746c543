//! Permission service
//!
//! Role checks against the stored account. The role in the access token is
//! only a hint; a demoted or disabled user loses access immediately.

use migtrack_common::AppError;
use migtrack_core::entities::User;
use migtrack_core::{DomainError, UserRole};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Fail with `InsufficientRole` unless `user` holds at least `required`
pub fn ensure_role(user: &User, required: UserRole) -> ServiceResult<()> {
    if user.has_role(required) {
        Ok(())
    } else {
        Err(DomainError::InsufficientRole { required }.into())
    }
}

/// Permission service for access control
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    /// Create a new PermissionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Load the acting user. Unknown ids are treated as a bad token.
    #[instrument(skip(self))]
    pub async fn actor(&self, user_id: i64) -> ServiceResult<User> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        if !user.is_active {
            debug!(user_id, "Rejected request from disabled account");
            return Err(DomainError::AccountDisabled.into());
        }
        Ok(user)
    }

    /// Load the acting user and check their role
    #[instrument(skip(self))]
    pub async fn require_role(&self, user_id: i64, required: UserRole) -> ServiceResult<User> {
        let user = self.actor(user_id).await?;
        ensure_role(&user, required)?;
        Ok(user)
    }
}
