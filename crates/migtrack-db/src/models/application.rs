//! Application database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for applications table
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationModel {
    pub id: i64,
    pub l2_id: String,
    pub app_name: String,
    pub supervision_year: i32,
    pub transformation_target: String,
    pub is_ak_completed: bool,
    pub is_cloud_native_completed: bool,
    pub current_stage: Option<String>,
    pub overall_status: String,
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

/// One-row aggregate behind the dashboard
#[derive(Debug, Clone, FromRow)]
pub struct DashboardStatsModel {
    pub total_applications: i64,
    pub active_applications: i64,
    pub completed_applications: i64,
    pub blocked_applications: i64,
    pub delayed_applications: i64,
    pub ak_completed_applications: i64,
    pub cloud_native_completed_applications: i64,
    pub both_completed_applications: i64,
    pub ak_target_applications: i64,
    pub cloud_native_target_applications: i64,
    pub ak_target_completed: i64,
    pub cloud_native_target_completed: i64,
    pub average_progress: f64,
    pub last_updated: Option<DateTime<Utc>>,
}
