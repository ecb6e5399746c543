//! Announcement entity

use chrono::{DateTime, Utc};

use super::task_assignment::Priority;
use crate::value_objects::text_enum;

text_enum! {
    /// Publication state of an announcement
    #[derive(Default)]
    pub enum AnnouncementStatus {
        #[default]
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

/// Announcement entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub status: AnnouncementStatus,
    pub created_by_user_id: i64,
    pub is_pinned: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Published, already public, and not yet expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AnnouncementStatus::Published
            && self.publish_date.is_some_and(|p| p <= now)
            && self.expire_date.map_or(true, |e| e > now)
    }

    /// Change status; publishing without a date publishes now
    pub fn set_status(&mut self, status: AnnouncementStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == AnnouncementStatus::Published && self.publish_date.is_none() {
            self.publish_date = Some(now);
        }
    }
}

/// Fields needed to insert an announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub status: AnnouncementStatus,
    pub created_by_user_id: i64,
    pub is_pinned: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
}

impl NewAnnouncement {
    /// Fill in `publish_date` for announcements created as published
    pub fn stamp_publish_date(&mut self, now: DateTime<Utc>) {
        if self.status == AnnouncementStatus::Published && self.publish_date.is_none() {
            self.publish_date = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn announcement(status: AnnouncementStatus) -> Announcement {
        let now = Utc::now();
        Announcement {
            id: 1,
            title: "Freeze window".to_string(),
            content: "No releases this weekend".to_string(),
            priority: Priority::High,
            status,
            created_by_user_id: 1,
            is_pinned: false,
            publish_date: None,
            expire_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_window() {
        let now = Utc::now();
        let mut a = announcement(AnnouncementStatus::Published);
        assert!(!a.is_active_at(now), "unpublished date is not active");

        a.publish_date = Some(now - Duration::days(1));
        assert!(a.is_active_at(now));

        a.expire_date = Some(now);
        assert!(!a.is_active_at(now), "expiry is exclusive");

        a.expire_date = Some(now + Duration::days(1));
        assert!(a.is_active_at(now));

        a.publish_date = Some(now + Duration::hours(1));
        assert!(!a.is_active_at(now), "future publish date");
    }

    #[test]
    fn test_draft_is_never_active() {
        let now = Utc::now();
        let mut a = announcement(AnnouncementStatus::Draft);
        a.publish_date = Some(now - Duration::days(1));
        assert!(!a.is_active_at(now));
    }

    #[test]
    fn test_publishing_stamps_date() {
        let now = Utc::now();
        let mut a = announcement(AnnouncementStatus::Draft);
        a.set_status(AnnouncementStatus::Published, now);
        assert_eq!(a.publish_date, Some(now));

        let later = now + Duration::days(2);
        a.set_status(AnnouncementStatus::Published, later);
        assert_eq!(a.publish_date, Some(now));
    }

    #[test]
    fn test_new_announcement_stamp() {
        let now = Utc::now();
        let mut new = NewAnnouncement {
            title: "t".to_string(),
            content: "c".to_string(),
            priority: Priority::Low,
            status: AnnouncementStatus::Published,
            created_by_user_id: 1,
            is_pinned: false,
            publish_date: None,
            expire_date: None,
        };
        new.stamp_publish_date(now);
        assert_eq!(new.publish_date, Some(now));

        new.status = AnnouncementStatus::Draft;
        new.publish_date = None;
        new.stamp_publish_date(now);
        assert!(new.publish_date.is_none());
    }
}
