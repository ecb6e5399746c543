//! Subtask model -> entity mapper

use migtrack_core::entities::{SubTask, SubTaskStatus, TransformationTarget};

use super::parse_text;
use crate::models::SubTaskModel;

impl From<SubTaskModel> for SubTask {
    fn from(model: SubTaskModel) -> Self {
        SubTask {
            id: model.id,
            application_id: model.application_id,
            module_name: model.module_name,
            sub_target: parse_text("sub_target", &model.sub_target, TransformationTarget::Ak),
            version_name: model.version_name,
            task_status: parse_text("task_status", &model.task_status, SubTaskStatus::NotStarted),
            progress_percentage: model.progress_percentage,
            is_blocked: model.is_blocked,
            block_reason: model.block_reason,
            planned_requirement_date: model.planned_requirement_date,
            planned_release_date: model.planned_release_date,
            planned_tech_online_date: model.planned_tech_online_date,
            planned_biz_online_date: model.planned_biz_online_date,
            actual_requirement_date: model.actual_requirement_date,
            actual_release_date: model.actual_release_date,
            actual_tech_online_date: model.actual_tech_online_date,
            actual_biz_online_date: model.actual_biz_online_date,
            requirements: model.requirements,
            technical_notes: model.technical_notes,
            priority: model.priority,
            estimated_hours: model.estimated_hours,
            actual_hours: model.actual_hours,
            assigned_to: model.assigned_to,
            reviewer: model.reviewer,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
