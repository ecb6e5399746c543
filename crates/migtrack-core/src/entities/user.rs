//! User entity - an account that signs in and owns changes

use chrono::{DateTime, Utc};

use crate::value_objects::UserRole;

/// User account. The password hash never leaves storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub team: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user holds at least `required`
    #[inline]
    pub fn has_role(&self, required: UserRole) -> bool {
        self.role.at_least(required)
    }

    /// Name shown in notifications and listings
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub team: Option<String>,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: 1,
            username: "alice".to_string(),
            full_name: String::new(),
            email: "alice@example.com".to_string(),
            department: None,
            team: None,
            role,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_role() {
        assert!(user(UserRole::Manager).has_role(UserRole::Editor));
        assert!(!user(UserRole::Viewer).has_role(UserRole::Editor));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut u = user(UserRole::Viewer);
        assert_eq!(u.display_name(), "alice");
        u.full_name = "Alice Liddell".to_string();
        assert_eq!(u.display_name(), "Alice Liddell");
    }
}
