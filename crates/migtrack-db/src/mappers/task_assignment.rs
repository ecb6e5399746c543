//! Task assignment model -> entity mapper

use migtrack_core::entities::{Priority, TaskAssignment, TaskStatus, TaskType};

use super::parse_text;
use crate::models::TaskAssignmentModel;

impl From<TaskAssignmentModel> for TaskAssignment {
    fn from(model: TaskAssignmentModel) -> Self {
        TaskAssignment {
            id: model.id,
            application_id: model.application_id,
            assigned_to_user_id: model.assigned_to_user_id,
            assigned_by_user_id: model.assigned_by_user_id,
            task_type: parse_text("task_type", &model.task_type, TaskType::General),
            title: model.title,
            description: model.description,
            priority: parse_text("priority", &model.priority, Priority::Medium),
            due_date: model.due_date,
            status: parse_text("status", &model.status, TaskStatus::Pending),
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
