//! Authentication service
//!
//! Handles user registration, login, and token refresh.

use migtrack_common::auth::{hash_password, validate_password_strength, verify_password};
use migtrack_common::AppError;
use migtrack_core::entities::{NewUser, User};
use migtrack_core::{DomainError, UserRole};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new user
    ///
    /// The very first account and any bootstrap email become admin; everyone
    /// else starts as viewer.
    #[instrument(skip(self, request), fields(username = %request.username, email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        validate_password_strength(&request.password)?;

        if self.ctx.user_repo().username_exists(&request.username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }
        if self.ctx.user_repo().email_exists(&request.email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let role = self.initial_role(&request.email).await?;
        let password_hash = hash_password(&request.password)?;

        let new_user = NewUser {
            full_name: request.full_name.unwrap_or_else(|| request.username.clone()),
            username: request.username,
            email: request.email,
            department: request.department,
            team: request.team,
            role,
        };
        let user = self.ctx.user_repo().create(&new_user, &password_hash).await?;

        info!(user_id = user.id, role = %user.role, "User registered successfully");

        self.issue_tokens(&user)
    }

    /// Login with username or email and password
    #[instrument(skip(self, request), fields(login = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let mut user = self
            .ctx
            .user_repo()
            .find_by_login(&request.username)
            .await?
            .ok_or_else(|| {
                warn!(login = %request.username, "Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = user.id, "Login failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        // Only reported once the password matched
        if !user.is_active {
            warn!(user_id = user.id, "Login failed: account disabled");
            return Err(DomainError::AccountDisabled.into());
        }

        self.ctx.user_repo().touch_last_login(user.id).await?;
        user.last_login_at = Some(Utc::now());

        info!(user_id = user.id, "User logged in successfully");

        self.issue_tokens(&user)
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// The role is re-read from storage, so a role change applies on refresh.
    #[instrument(skip(self, request))]
    pub async fn refresh_tokens(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)?;

        let user = PermissionService::new(self.ctx)
            .actor(claims.user_id()?)
            .await?;

        info!(user_id = user.id, "Tokens refreshed");

        self.issue_tokens(&user)
    }

    /// Get the current user
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: i64) -> ServiceResult<UserResponse> {
        let user = PermissionService::new(self.ctx).actor(user_id).await?;
        Ok(UserResponse::from(user))
    }

    async fn initial_role(&self, email: &str) -> ServiceResult<UserRole> {
        if self.ctx.user_repo().count().await? == 0 {
            info!("First account is registered as admin");
            return Ok(UserRole::Admin);
        }
        if self.ctx.auth_config().is_bootstrap_admin(email) {
            info!("Bootstrap email is registered as admin");
            return Ok(UserRole::Admin);
        }
        Ok(UserRole::Viewer)
    }

    fn issue_tokens(&self, user: &User) -> ServiceResult<AuthResponse> {
        let token_pair = self.ctx.jwt_service().generate_token_pair(user.id, user.role)?;

        Ok(AuthResponse::new(
            token_pair.access_token,
            token_pair.refresh_token,
            token_pair.expires_in,
            UserResponse::from(user),
        ))
    }
}
