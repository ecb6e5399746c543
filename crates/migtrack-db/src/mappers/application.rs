//! Application model -> entity mapper

use migtrack_core::entities::{Application, ApplicationStatus, TransformationTarget};
use migtrack_core::traits::DashboardStats;

use super::parse_text;
use crate::models::{ApplicationModel, DashboardStatsModel};

fn count(value: i64) -> u64 {
    value.max(0) as u64
}

impl From<DashboardStatsModel> for DashboardStats {
    fn from(model: DashboardStatsModel) -> Self {
        DashboardStats {
            total_applications: count(model.total_applications),
            active_applications: count(model.active_applications),
            completed_applications: count(model.completed_applications),
            blocked_applications: count(model.blocked_applications),
            delayed_applications: count(model.delayed_applications),
            ak_completed_applications: count(model.ak_completed_applications),
            cloud_native_completed_applications: count(model.cloud_native_completed_applications),
            both_completed_applications: count(model.both_completed_applications),
            ak_target_applications: count(model.ak_target_applications),
            cloud_native_target_applications: count(model.cloud_native_target_applications),
            ak_target_completed: count(model.ak_target_completed),
            cloud_native_target_completed: count(model.cloud_native_target_completed),
            average_progress: model.average_progress,
            last_updated: model.last_updated,
        }
    }
}

impl From<ApplicationModel> for Application {
    fn from(model: ApplicationModel) -> Self {
        Application {
            id: model.id,
            l2_id: model.l2_id,
            app_name: model.app_name,
            supervision_year: model.supervision_year,
            transformation_target: parse_text(
                "transformation_target",
                &model.transformation_target,
                TransformationTarget::Ak,
            ),
            is_ak_completed: model.is_ak_completed,
            is_cloud_native_completed: model.is_cloud_native_completed,
            current_stage: model.current_stage,
            overall_status: parse_text(
                "overall_status",
                &model.overall_status,
                ApplicationStatus::NotStarted,
            ),
            responsible_team: model.responsible_team,
            responsible_person: model.responsible_person,
            progress_percentage: model.progress_percentage,
            planned_requirement_date: model.planned_requirement_date,
            planned_release_date: model.planned_release_date,
            planned_tech_online_date: model.planned_tech_online_date,
            planned_biz_online_date: model.planned_biz_online_date,
            actual_requirement_date: model.actual_requirement_date,
            actual_release_date: model.actual_release_date,
            actual_tech_online_date: model.actual_tech_online_date,
            actual_biz_online_date: model.actual_biz_online_date,
            is_delayed: model.is_delayed,
            delay_days: model.delay_days,
            notes: model.notes,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
