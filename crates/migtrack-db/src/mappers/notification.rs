//! Notification model -> entity mapper

use migtrack_core::entities::{Notification, NotificationType};

use super::parse_text;
use crate::models::NotificationModel;

impl From<NotificationModel> for Notification {
    fn from(model: NotificationModel) -> Self {
        Notification {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            message: model.message,
            notification_type: parse_text(
                "notification_type",
                &model.notification_type,
                NotificationType::Info,
            ),
            is_read: model.is_read,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
