//! Menu service
//!
//! The navigation menu is a fixed lookup on the caller's role.

use migtrack_core::UserRole;
use tracing::instrument;

use crate::dto::{MenuGroup, MenuItem, MenuResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

const fn item(
    id: &'static str,
    title: &'static str,
    path: &'static str,
    icon: &'static str,
    order: u32,
) -> MenuItem {
    MenuItem {
        id,
        name: id,
        title,
        path,
        icon,
        order,
    }
}

const DASHBOARD: MenuItem = item("dashboard", "Dashboard", "/dashboard", "odometer", 1);
const APPLICATIONS: MenuItem = item("applications", "Applications", "/applications", "document", 2);
const MY_TASKS: MenuItem = item("my-tasks", "My Tasks", "/my-tasks", "user", 3);

const IMPORT: MenuItem = item("import", "Data Import", "/import", "upload", 1);
const REPORTS: MenuItem = item("reports", "Reports", "/reports", "pie-chart", 2);

const USER_MANAGEMENT: MenuItem =
    item("user-management", "User Management", "/user-management", "setting", 1);
const ANNOUNCEMENTS: MenuItem = item("announcements", "Announcements", "/announcements", "bell-filled", 2);
const AUDIT: MenuItem = item("audit", "Audit Log", "/audit", "search", 3);

const MCP_AGENT: MenuItem = item("mcp-agent", "AI Assistant", "/mcp-agent", "chat-dot-round", 1);

/// Menu groups visible to `role`, in display order. Empty groups are omitted.
pub fn menu_for_role(role: UserRole) -> MenuResponse {
    let common = match role {
        UserRole::Viewer => vec![DASHBOARD, APPLICATIONS],
        _ => vec![DASHBOARD, APPLICATIONS, MY_TASKS],
    };
    let data_management = match role {
        UserRole::Admin | UserRole::Manager => vec![IMPORT, REPORTS],
        _ => Vec::new(),
    };
    let system_management = match role {
        UserRole::Admin => vec![USER_MANAGEMENT, ANNOUNCEMENTS, AUDIT],
        UserRole::Manager => vec![ANNOUNCEMENTS],
        _ => Vec::new(),
    };
    let tools = vec![MCP_AGENT];

    let menu_groups = [
        ("common", "Common", 1, common),
        ("data-management", "Data Management", 2, data_management),
        ("system-management", "System Management", 3, system_management),
        ("tools", "Tools", 4, tools),
    ]
    .into_iter()
    .filter(|(_, _, _, items)| !items.is_empty())
    .map(|(id, title, order, items)| MenuGroup {
        id,
        title,
        order,
        items,
    })
    .collect();

    MenuResponse {
        user_role: role,
        menu_groups,
    }
}

/// Menu service
pub struct MenuService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MenuService<'a> {
    /// Create a new MenuService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Menu for the caller's stored role
    #[instrument(skip(self))]
    pub async fn menu(&self, user_id: i64) -> ServiceResult<MenuResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        Ok(menu_for_role(actor.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(role: UserRole) -> Vec<(&'static str, Vec<&'static str>)> {
        menu_for_role(role)
            .menu_groups
            .into_iter()
            .map(|g| (g.id, g.items.into_iter().map(|i| i.id).collect()))
            .collect()
    }

    #[test]
    fn test_admin_menu() {
        assert_eq!(
            layout(UserRole::Admin),
            vec![
                ("common", vec!["dashboard", "applications", "my-tasks"]),
                ("data-management", vec!["import", "reports"]),
                ("system-management", vec!["user-management", "announcements", "audit"]),
                ("tools", vec!["mcp-agent"]),
            ]
        );
    }

    #[test]
    fn test_manager_menu() {
        assert_eq!(
            layout(UserRole::Manager),
            vec![
                ("common", vec!["dashboard", "applications", "my-tasks"]),
                ("data-management", vec!["import", "reports"]),
                ("system-management", vec!["announcements"]),
                ("tools", vec!["mcp-agent"]),
            ]
        );
    }

    #[test]
    fn test_editor_and_viewer_menus() {
        assert_eq!(
            layout(UserRole::Editor),
            vec![
                ("common", vec!["dashboard", "applications", "my-tasks"]),
                ("tools", vec!["mcp-agent"]),
            ]
        );
        assert_eq!(
            layout(UserRole::Viewer),
            vec![
                ("common", vec!["dashboard", "applications"]),
                ("tools", vec!["mcp-agent"]),
            ]
        );
    }

    #[test]
    fn test_menu_is_deterministic() {
        for &role in UserRole::ALL {
            assert_eq!(menu_for_role(role), menu_for_role(role));
            assert_eq!(menu_for_role(role).user_role, role);
        }
    }

    #[test]
    fn test_group_order_is_ascending() {
        let orders: Vec<u32> = menu_for_role(UserRole::Admin)
            .menu_groups
            .iter()
            .map(|g| g.order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }
}
