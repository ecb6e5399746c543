//! User roles
//!
//! Roles form a strict ladder: admin > manager > editor > viewer.
//! A permission check asks whether a role is at least some required role.

use super::text_enum;

text_enum! {
    /// Role assigned to every user account
    #[derive(Default)]
    pub enum UserRole {
        Admin => "admin",
        Manager => "manager",
        Editor => "editor",
        #[default]
        Viewer => "viewer",
    }
}

impl UserRole {
    /// Position on the ladder (higher is more privileged)
    pub const fn rank(self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Manager => 2,
            Self::Editor => 1,
            Self::Viewer => 0,
        }
    }

    /// Check whether this role satisfies `required`
    pub const fn at_least(self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}
