//! Announcement service
//!
//! Writes need manager; any signed-in user may read.

use chrono::{DateTime, Utc};
use migtrack_core::entities::{Announcement, NewAnnouncement};
use migtrack_core::traits::AnnouncementFilter;
use migtrack_core::{DomainError, Page, PageRequest, UserRole};
use tracing::{info, instrument};

use crate::dto::{
    AnnouncementListQuery, AnnouncementResponse, CreateAnnouncementRequest,
    UpdateAnnouncementRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Default number of active announcements returned
pub const DEFAULT_ACTIVE_LIMIT: u32 = 10;
/// Cap on the active/pinned lists
pub const MAX_ACTIVE_LIMIT: u32 = 100;

/// Announcement service
pub struct AnnouncementService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AnnouncementService<'a> {
    /// Create a new AnnouncementService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an announcement (manager+)
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_announcement(
        &self,
        user_id: i64,
        request: CreateAnnouncementRequest,
    ) -> ServiceResult<AnnouncementResponse> {
        let actor = PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;
        check_window(request.publish_date, request.expire_date)?;

        let mut new_announcement = NewAnnouncement {
            title: request.title,
            content: request.content,
            priority: request.priority,
            status: request.status,
            created_by_user_id: actor.id,
            is_pinned: request.is_pinned,
            publish_date: request.publish_date,
            expire_date: request.expire_date,
        };
        new_announcement.stamp_publish_date(Utc::now());

        let announcement = self
            .ctx
            .announcement_repo()
            .create(&new_announcement, actor.id)
            .await?;

        info!(announcement_id = announcement.id, status = %announcement.status, "Announcement created");

        Ok(AnnouncementResponse::from(announcement))
    }

    /// Get an announcement by ID
    #[instrument(skip(self))]
    pub async fn get_announcement(
        &self,
        user_id: i64,
        announcement_id: i64,
    ) -> ServiceResult<AnnouncementResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;
        let announcement = self.find(announcement_id).await?;
        Ok(AnnouncementResponse::from(announcement))
    }

    /// Partially update an announcement (manager+)
    #[instrument(skip(self, request))]
    pub async fn update_announcement(
        &self,
        user_id: i64,
        announcement_id: i64,
        request: UpdateAnnouncementRequest,
    ) -> ServiceResult<AnnouncementResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let patch = |announcement: &mut Announcement| {
            apply_update(announcement, request.clone());
            check_window(announcement.publish_date, announcement.expire_date)
        };
        let announcement = self
            .ctx
            .announcement_repo()
            .update(announcement_id, &patch, user_id)
            .await?;

        info!(announcement_id, "Announcement updated");

        Ok(AnnouncementResponse::from(announcement))
    }

    /// Delete an announcement (manager+)
    #[instrument(skip(self))]
    pub async fn delete_announcement(&self, user_id: i64, announcement_id: i64) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        self.ctx
            .announcement_repo()
            .delete(announcement_id, user_id)
            .await?;

        info!(announcement_id, "Announcement deleted");
        Ok(())
    }

    /// Pin or unpin (manager+)
    #[instrument(skip(self))]
    pub async fn pin_announcement(
        &self,
        user_id: i64,
        announcement_id: i64,
        is_pinned: bool,
    ) -> ServiceResult<AnnouncementResponse> {
        self.update_announcement(
            user_id,
            announcement_id,
            UpdateAnnouncementRequest {
                is_pinned: Some(is_pinned),
                ..Default::default()
            },
        )
        .await
    }

    /// Filtered page, pinned first then newest
    #[instrument(skip(self, query))]
    pub async fn list_announcements(
        &self,
        user_id: i64,
        query: AnnouncementListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<AnnouncementResponse>> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let filter = AnnouncementFilter::from(query);
        let (announcements, total) = self.ctx.announcement_repo().list(&filter, page).await?;

        let now = Utc::now();
        Ok(Page::new(announcements, total, page).map(|a| AnnouncementResponse::at(a, now)))
    }

    /// Announcements visible right now, pinned first
    #[instrument(skip(self))]
    pub async fn active_announcements(
        &self,
        user_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<AnnouncementResponse>> {
        self.visible(user_id, limit, false).await
    }

    /// Visible pinned announcements, newest first
    #[instrument(skip(self))]
    pub async fn pinned_announcements(
        &self,
        user_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<AnnouncementResponse>> {
        self.visible(user_id, limit, true).await
    }

    async fn visible(
        &self,
        user_id: i64,
        limit: Option<u32>,
        pinned_only: bool,
    ) -> ServiceResult<Vec<AnnouncementResponse>> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let limit = limit
            .unwrap_or(DEFAULT_ACTIVE_LIMIT)
            .clamp(1, MAX_ACTIVE_LIMIT);
        let now = Utc::now();
        let announcements = self
            .ctx
            .announcement_repo()
            .find_active(now, i64::from(limit), pinned_only)
            .await?;

        Ok(announcements
            .into_iter()
            .map(|a| AnnouncementResponse::at(a, now))
            .collect())
    }

    async fn find(&self, announcement_id: i64) -> ServiceResult<Announcement> {
        self.ctx
            .announcement_repo()
            .find_by_id(announcement_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Announcement", announcement_id.to_string()))
    }
}

fn check_window(
    publish_date: Option<DateTime<Utc>>,
    expire_date: Option<DateTime<Utc>>,
) -> Result<(), DomainError> {
    match (publish_date, expire_date) {
        (Some(publish), Some(expire)) if expire <= publish => Err(DomainError::ValidationError(
            "expire_date must be after publish_date".to_string(),
        )),
        _ => Ok(()),
    }
}

fn apply_update(announcement: &mut Announcement, request: UpdateAnnouncementRequest) {
    if let Some(title) = request.title {
        announcement.title = title;
    }
    if let Some(content) = request.content {
        announcement.content = content;
    }
    if let Some(priority) = request.priority {
        announcement.priority = priority;
    }
    if let Some(is_pinned) = request.is_pinned {
        announcement.is_pinned = is_pinned;
    }
    if let Some(publish_date) = request.publish_date {
        announcement.publish_date = Some(publish_date);
    }
    if let Some(expire_date) = request.expire_date {
        announcement.expire_date = Some(expire_date);
    }
    // After publish_date so an explicit date is not replaced by now
    if let Some(status) = request.status {
        announcement.set_status(status, Utc::now());
    }
}
