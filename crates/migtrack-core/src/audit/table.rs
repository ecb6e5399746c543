//! Audited tables and the columns a rollback may write

use crate::value_objects::text_enum;

text_enum! {
    /// A table whose mutations are written to the audit log
    pub enum AuditTable {
        Applications => "applications",
        SubTasks => "sub_tasks",
        TaskAssignments => "task_assignments",
        Announcements => "announcements",
    }
}

const APPLICATION_COLUMNS: &[&str] = &[
    "l2_id",
    "app_name",
    "supervision_year",
    "transformation_target",
    "is_ak_completed",
    "is_cloud_native_completed",
    "current_stage",
    "overall_status",
    "responsible_team",
    "responsible_person",
    "progress_percentage",
    "planned_requirement_date",
    "planned_release_date",
    "planned_tech_online_date",
    "planned_biz_online_date",
    "actual_requirement_date",
    "actual_release_date",
    "actual_tech_online_date",
    "actual_biz_online_date",
    "is_delayed",
    "delay_days",
    "notes",
    "created_by",
    "updated_by",
];

const SUB_TASK_COLUMNS: &[&str] = &[
    "application_id",
    "module_name",
    "sub_target",
    "version_name",
    "task_status",
    "progress_percentage",
    "is_blocked",
    "block_reason",
    "planned_requirement_date",
    "planned_release_date",
    "planned_tech_online_date",
    "planned_biz_online_date",
    "actual_requirement_date",
    "actual_release_date",
    "actual_tech_online_date",
    "actual_biz_online_date",
    "requirements",
    "technical_notes",
    "priority",
    "estimated_hours",
    "actual_hours",
    "assigned_to",
    "reviewer",
    "created_by",
    "updated_by",
];

const TASK_ASSIGNMENT_COLUMNS: &[&str] = &[
    "application_id",
    "assigned_to_user_id",
    "assigned_by_user_id",
    "task_type",
    "title",
    "description",
    "priority",
    "due_date",
    "status",
    "completed_at",
];

const ANNOUNCEMENT_COLUMNS: &[&str] = &[
    "title",
    "content",
    "priority",
    "status",
    "created_by_user_id",
    "is_pinned",
    "publish_date",
    "expire_date",
];

impl AuditTable {
    /// SQL table name. Only ever one of the fixed names above.
    pub const fn table_name(self) -> &'static str {
        self.as_str()
    }

    /// Columns an UPDATE rollback may write. Excludes `id`, `created_at` and `updated_at`.
    pub const fn restorable_columns(self) -> &'static [&'static str] {
        match self {
            Self::Applications => APPLICATION_COLUMNS,
            Self::SubTasks => SUB_TASK_COLUMNS,
            Self::TaskAssignments => TASK_ASSIGNMENT_COLUMNS,
            Self::Announcements => ANNOUNCEMENT_COLUMNS,
        }
    }

    pub fn is_restorable(self, column: &str) -> bool {
        self.restorable_columns().contains(&column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookkeeping_columns_are_not_restorable() {
        for table in AuditTable::ALL {
            assert!(!table.is_restorable("id"), "{table}");
            assert!(!table.is_restorable("created_at"), "{table}");
            assert!(!table.is_restorable("updated_at"), "{table}");
        }
    }

    #[test]
    fn test_lookup_by_table_name() {
        assert_eq!("sub_tasks".parse::<AuditTable>().unwrap(), AuditTable::SubTasks);
        assert!("users".parse::<AuditTable>().is_err());
        assert!(AuditTable::Applications.is_restorable("app_name"));
    }
}
