//! Announcement model -> entity mapper

use migtrack_core::entities::{Announcement, AnnouncementStatus, Priority};

use super::parse_text;
use crate::models::AnnouncementModel;

impl From<AnnouncementModel> for Announcement {
    fn from(model: AnnouncementModel) -> Self {
        Announcement {
            id: model.id,
            title: model.title,
            content: model.content,
            priority: parse_text("priority", &model.priority, Priority::Medium),
            status: parse_text("status", &model.status, AnnouncementStatus::Draft),
            created_by_user_id: model.created_by_user_id,
            is_pinned: model.is_pinned,
            publish_date: model.publish_date,
            expire_date: model.expire_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
