//! SubTask entity - one migration work item of an application

use chrono::{DateTime, NaiveDate, Utc};

use super::application::TransformationTarget;
use crate::value_objects::text_enum;

text_enum! {
    /// Lifecycle of a subtask
    #[derive(Default)]
    pub enum SubTaskStatus {
        #[default]
        NotStarted => "not_started",
        DevInProgress => "dev_in_progress",
        Testing => "testing",
        DeploymentReady => "deployment_ready",
        BizOnline => "biz_online",
        Completed => "completed",
        Blocked => "blocked",
    }
}

impl SubTaskStatus {
    /// Progress implied by the status. `Blocked` keeps whatever progress was reached.
    pub const fn default_progress(self) -> Option<i32> {
        match self {
            Self::NotStarted => Some(0),
            Self::DevInProgress => Some(30),
            Self::Testing => Some(60),
            Self::DeploymentReady => Some(80),
            Self::BizOnline => Some(90),
            Self::Completed => Some(100),
            Self::Blocked => None,
        }
    }
}

/// SubTask entity
#[derive(Debug, Clone, PartialEq)]
pub struct SubTask {
    pub id: i64,
    pub application_id: i64,
    pub module_name: String,
    pub sub_target: TransformationTarget,
    pub version_name: Option<String>,
    pub task_status: SubTaskStatus,
    pub progress_percentage: i32,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,
    pub requirements: Option<String>,
    pub technical_notes: Option<String>,
    pub priority: i32,
    pub estimated_hours: Option<i32>,
    pub actual_hours: Option<i32>,
    pub assigned_to: Option<String>,
    pub reviewer: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubTask {
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.task_status == SubTaskStatus::Completed
    }

    /// Planned biz-online date has passed without completion, or completion came after it
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.days_delayed(today) > 0
    }

    /// Days past the planned biz-online date (0 when on schedule or unplanned)
    pub fn days_delayed(&self, today: NaiveDate) -> i64 {
        let Some(planned) = self.planned_biz_online_date else {
            return 0;
        };
        if self.is_completed() {
            match self.actual_biz_online_date {
                Some(actual) if actual > planned => (actual - planned).num_days(),
                _ => 0,
            }
        } else if today > planned {
            (today - planned).num_days()
        } else {
            0
        }
    }

    /// Move to `status`, filling progress from the status table.
    ///
    /// `is_blocked` follows the status unless `blocked_override` is given.
    pub fn apply_status(&mut self, status: SubTaskStatus, blocked_override: Option<bool>) {
        self.task_status = status;
        if let Some(progress) = status.default_progress() {
            self.progress_percentage = progress;
        }
        self.is_blocked = blocked_override.unwrap_or(status == SubTaskStatus::Blocked);
    }
}

/// Fields needed to insert a subtask
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubTask {
    pub application_id: i64,
    pub module_name: String,
    pub sub_target: TransformationTarget,
    pub version_name: Option<String>,
    pub task_status: SubTaskStatus,
    pub progress_percentage: i32,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,
    pub requirements: Option<String>,
    pub technical_notes: Option<String>,
    pub priority: i32,
    pub estimated_hours: Option<i32>,
    pub actual_hours: Option<i32>,
    pub assigned_to: Option<String>,
    pub reviewer: Option<String>,
}
