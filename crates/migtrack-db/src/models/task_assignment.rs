//! Task assignment database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for task_assignments table
#[derive(Debug, Clone, FromRow)]
pub struct TaskAssignmentModel {
    pub id: i64,
    pub application_id: i64,
    pub assigned_to_user_id: i64,
    pub assigned_by_user_id: i64,
    pub task_type: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
