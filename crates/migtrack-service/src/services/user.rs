//! User service
//!
//! Account listing and admin management of roles and the active flag.

use migtrack_core::{Page, PageRequest, UserRole};
use tracing::{info, instrument};

use crate::dto::{UpdateUserAccessRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{ensure_role, PermissionService};

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List all accounts (admin only)
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> ServiceResult<Page<UserResponse>> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Admin)
            .await?;

        let (users, total) = self.ctx.user_repo().list(page).await?;
        Ok(Page::new(users, total, page).map(UserResponse::from))
    }

    /// Get one account. Users may read themselves; reading others needs manager.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i64, target_id: i64) -> ServiceResult<UserResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        if actor.id == target_id {
            return Ok(UserResponse::from(actor));
        }
        ensure_role(&actor, UserRole::Manager)?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", target_id.to_string()))?;

        Ok(UserResponse::from(user))
    }

    /// Change role and/or active flag (admin only)
    #[instrument(skip(self, request))]
    pub async fn update_access(
        &self,
        user_id: i64,
        target_id: i64,
        request: UpdateUserAccessRequest,
    ) -> ServiceResult<UserResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Admin)
            .await?;

        if request.role.is_none() && request.is_active.is_none() {
            return Err(ServiceError::validation("Nothing to update"));
        }
        if user_id == target_id
            && (request.is_active == Some(false)
                || request.role.is_some_and(|role| !role.is_admin()))
        {
            return Err(ServiceError::validation(
                "Admins cannot demote or disable their own account",
            ));
        }

        let user = self
            .ctx
            .user_repo()
            .update_access(target_id, request.role, request.is_active)
            .await?;

        info!(
            target_id,
            role = %user.role,
            is_active = user.is_active,
            "User access updated"
        );

        Ok(UserResponse::from(user))
    }
}
