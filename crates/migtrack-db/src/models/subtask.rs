//! Subtask database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for sub_tasks table
#[derive(Debug, Clone, FromRow)]
pub struct SubTaskModel {
    pub id: i64,
    pub application_id: i64,
    pub module_name: String,
    pub sub_target: String,
    pub version_name: Option<String>,
    pub task_status: String,
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
