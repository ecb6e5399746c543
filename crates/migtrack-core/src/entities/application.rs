//! Application entity - a system being migrated, tracked by its L2 id

use chrono::{DateTime, NaiveDate, Utc};

use super::subtask::SubTask;
use crate::value_objects::text_enum;

text_enum! {
    /// Migration target of an application or subtask
    pub enum TransformationTarget {
        Ak => "ak",
        CloudNative => "cloud_native",
    }
}

text_enum! {
    /// Overall status, derived from subtasks once any exist
    #[derive(Default)]
    pub enum ApplicationStatus {
        #[default]
        NotStarted => "not_started",
        DevInProgress => "dev_in_progress",
        BizOnline => "biz_online",
        Completed => "completed",
    }
}

/// Application entity
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub id: i64,
    pub l2_id: String,
    pub app_name: String,
    pub supervision_year: i32,
    pub transformation_target: TransformationTarget,
    pub is_ak_completed: bool,
    pub is_cloud_native_completed: bool,
    pub current_stage: Option<String>,
    pub overall_status: ApplicationStatus,
    pub responsible_team: String,
    pub responsible_person: Option<String>,
    pub progress_percentage: i32,
    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub actual_requirement_date: Option<NaiveDate>,
    pub actual_release_date: Option<NaiveDate>,
    pub actual_tech_online_date: Option<NaiveDate>,
    pub actual_biz_online_date: Option<NaiveDate>,
    pub is_delayed: bool,
    pub delay_days: i32,
    pub notes: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Recompute progress, status, completion flags and delay from `subtasks`.
    ///
    /// Returns `true` when any field changed.
    pub fn recompute_from_subtasks(&mut self, subtasks: &[SubTask], today: NaiveDate) -> bool {
        let before = self.clone();

        let total = subtasks.len();
        let completed = subtasks.iter().filter(|t| t.is_completed()).count();

        if total == 0 {
            self.progress_percentage = 0;
            self.overall_status = ApplicationStatus::NotStarted;
        } else {
            self.progress_percentage = (completed * 100 / total) as i32;
            self.overall_status = if completed == 0 {
                ApplicationStatus::NotStarted
            } else if completed == total {
                ApplicationStatus::Completed
            } else if subtasks
                .iter()
                .any(|t| t.task_status == super::SubTaskStatus::BizOnline)
            {
                ApplicationStatus::BizOnline
            } else {
                ApplicationStatus::DevInProgress
            };
        }

        self.is_ak_completed = target_completed(subtasks, TransformationTarget::Ak);
        self.is_cloud_native_completed = target_completed(subtasks, TransformationTarget::CloudNative);

        let (is_delayed, delay_days) = self.delay(today);
        self.is_delayed = is_delayed;
        self.delay_days = delay_days;

        *self != before
    }

    /// Delay against the planned biz-online date
    fn delay(&self, today: NaiveDate) -> (bool, i32) {
        let Some(planned) = self.planned_biz_online_date else {
            return (false, 0);
        };
        let reference = if self.overall_status == ApplicationStatus::Completed {
            match self.actual_biz_online_date {
                Some(actual) => actual,
                None => return (false, 0),
            }
        } else {
            today
        };
        if reference > planned {
            (true, (reference - planned).num_days() as i32)
        } else {
            (false, 0)
        }
    }
}

/// A target counts as completed only when it has subtasks and all of them are done
fn target_completed(subtasks: &[SubTask], target: TransformationTarget) -> bool {
    let mut matching = subtasks.iter().filter(|t| t.sub_target == target).peekable();
    matching.peek().is_some() && matching.all(SubTask::is_completed)
}

/// Fields needed to insert an application
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub l2_id: String,
    pub app_name: String,
    pub supervision_year: i32,
    pub transformation_target: TransformationTarget,
    pub current_stage: Option<String>,
    pub overall_status: ApplicationStatus,
    pub responsible_team: String,
    pub responsible_person: Option<String>,
    pub planned_requirement_date: Option<NaiveDate>,
    pub planned_release_date: Option<NaiveDate>,
    pub planned_tech_online_date: Option<NaiveDate>,
    pub planned_biz_online_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
