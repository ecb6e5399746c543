//! Notification service
//!
//! Each user only ever sees and changes their own notifications.

use migtrack_core::{Page, PageRequest};
use tracing::{info, instrument};

use crate::dto::{MarkAllReadResponse, NotificationResponse, UnreadCountResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        page: PageRequest,
    ) -> ServiceResult<Page<NotificationResponse>> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;

        let (notifications, total) = self
            .ctx
            .notification_repo()
            .list_for_user(actor.id, unread_only, page)
            .await?;

        Ok(Page::new(notifications, total, page).map(NotificationResponse::from))
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self, user_id: i64) -> ServiceResult<UnreadCountResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        let count = self.ctx.notification_repo().unread_count(actor.id).await?;
        Ok(UnreadCountResponse { count })
    }

    /// Mark one of the caller's notifications read. Someone else's id is not found.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> ServiceResult<NotificationResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        let notification = self
            .ctx
            .notification_repo()
            .mark_read(notification_id, actor.id)
            .await?;
        Ok(NotificationResponse::from(notification))
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: i64) -> ServiceResult<MarkAllReadResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        let updated = self.ctx.notification_repo().mark_all_read(actor.id).await?;

        info!(user_id, updated, "Notifications marked read");

        Ok(MarkAllReadResponse { updated })
    }
}
