//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chrono::{DateTime, NaiveDate, Utc};

use migtrack_core::entities::{
    Announcement, Application, AuditLog, Notification, SubTask, TaskAssignment, User,
};

use super::responses::{
    AnnouncementResponse, ApplicationResponse, AuditLogResponse, NotificationResponse,
    SubTaskResponse, TaskAssignmentResponse, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            department: user.department.clone(),
            team: user.team.clone(),
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Application Mappers
// ============================================================================

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            l2_id: app.l2_id,
            app_name: app.app_name,
            supervision_year: app.supervision_year,
            transformation_target: app.transformation_target,
            is_ak_completed: app.is_ak_completed,
            is_cloud_native_completed: app.is_cloud_native_completed,
            current_stage: app.current_stage,
            overall_status: app.overall_status,
            responsible_team: app.responsible_team,
            responsible_person: app.responsible_person,
            progress_percentage: app.progress_percentage,
            planned_requirement_date: app.planned_requirement_date,
            planned_release_date: app.planned_release_date,
            planned_tech_online_date: app.planned_tech_online_date,
            planned_biz_online_date: app.planned_biz_online_date,
            actual_requirement_date: app.actual_requirement_date,
            actual_release_date: app.actual_release_date,
            actual_tech_online_date: app.actual_tech_online_date,
            actual_biz_online_date: app.actual_biz_online_date,
            is_delayed: app.is_delayed,
            delay_days: app.delay_days,
            notes: app.notes,
            created_by: app.created_by,
            updated_by: app.updated_by,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}

// ============================================================================
// SubTask Mappers
// ============================================================================

impl SubTaskResponse {
    /// Render a subtask with its schedule fields evaluated on `today`
    pub fn at(task: SubTask, today: NaiveDate) -> Self {
        let is_completed = task.is_completed();
        let is_overdue = task.is_overdue(today);
        let days_delayed = task.days_delayed(today);
        Self {
            id: task.id,
            application_id: task.application_id,
            module_name: task.module_name,
            sub_target: task.sub_target,
            version_name: task.version_name,
            task_status: task.task_status,
            progress_percentage: task.progress_percentage,
            is_blocked: task.is_blocked,
            block_reason: task.block_reason,
            planned_requirement_date: task.planned_requirement_date,
            planned_release_date: task.planned_release_date,
            planned_tech_online_date: task.planned_tech_online_date,
            planned_biz_online_date: task.planned_biz_online_date,
            actual_requirement_date: task.actual_requirement_date,
            actual_release_date: task.actual_release_date,
            actual_tech_online_date: task.actual_tech_online_date,
            actual_biz_online_date: task.actual_biz_online_date,
            requirements: task.requirements,
            technical_notes: task.technical_notes,
            priority: task.priority,
            estimated_hours: task.estimated_hours,
            actual_hours: task.actual_hours,
            assigned_to: task.assigned_to,
            reviewer: task.reviewer,
            created_by: task.created_by,
            updated_by: task.updated_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
            is_completed,
            is_overdue,
            days_delayed,
        }
    }
}

impl From<SubTask> for SubTaskResponse {
    fn from(task: SubTask) -> Self {
        Self::at(task, Utc::now().date_naive())
    }
}

// ============================================================================
// Task Assignment Mappers
// ============================================================================

impl From<TaskAssignment> for TaskAssignmentResponse {
    fn from(task: TaskAssignment) -> Self {
        Self {
            id: task.id,
            application_id: task.application_id,
            assigned_to_user_id: task.assigned_to_user_id,
            assigned_by_user_id: task.assigned_by_user_id,
            task_type: task.task_type,
            title: task.title,
            description: task.description,
            priority: task.priority,
            due_date: task.due_date,
            status: task.status,
            completed_at: task.completed_at,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

// ============================================================================
// Announcement Mappers
// ============================================================================

impl AnnouncementResponse {
    pub fn at(announcement: Announcement, now: DateTime<Utc>) -> Self {
        let is_active = announcement.is_active_at(now);
        Self {
            id: announcement.id,
            title: announcement.title,
            content: announcement.content,
            priority: announcement.priority,
            status: announcement.status,
            created_by_user_id: announcement.created_by_user_id,
            is_pinned: announcement.is_pinned,
            publish_date: announcement.publish_date,
            expire_date: announcement.expire_date,
            created_at: announcement.created_at,
            updated_at: announcement.updated_at,
            is_active,
        }
    }
}

impl From<Announcement> for AnnouncementResponse {
    fn from(announcement: Announcement) -> Self {
        Self::at(announcement, Utc::now())
    }
}

// ============================================================================
// Notification Mappers
// ============================================================================

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type,
            is_read: n.is_read,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

// ============================================================================
// Audit Mappers
// ============================================================================

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            table_name: log.table_name,
            record_id: log.record_id,
            operation: log.operation,
            old_values: log.old_values,
            new_values: log.new_values,
            changed_fields: log.changed_fields,
            user_id: log.user_id,
            reason: log.reason,
            rollback_of: log.rollback_of,
            created_at: log.created_at,
        }
    }
}
