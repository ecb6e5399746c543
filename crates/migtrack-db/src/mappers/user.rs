//! User model -> entity mapper

use migtrack_core::entities::User;
use migtrack_core::value_objects::UserRole;

use super::parse_text;
use crate::models::UserModel;

/// Convert UserModel to User entity. The password hash stays behind.
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            email: model.email,
            department: model.department,
            team: model.team,
            role: parse_text("role", &model.role, UserRole::Viewer),
            is_active: model.is_active,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
