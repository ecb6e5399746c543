//! Announcement database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for announcements table
#[derive(Debug, Clone, FromRow)]
pub struct AnnouncementModel {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub priority: String,
    pub status: String,
    pub created_by_user_id: i64,
    pub is_pinned: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
