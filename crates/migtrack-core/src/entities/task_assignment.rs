//! TaskAssignment entity - work handed from one user to another

use chrono::{DateTime, NaiveDate, Utc};

use crate::value_objects::text_enum;

text_enum! {
    /// Kind of assigned work
    #[derive(Default)]
    pub enum TaskType {
        UpdateProgress => "update_progress",
        FixBlocking => "fix_blocking",
        CompleteMilestone => "complete_milestone",
        #[default]
        General => "general",
    }
}

text_enum! {
    /// Priority shared by task assignments and announcements
    #[derive(Default)]
    pub enum Priority {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

text_enum! {
    /// Lifecycle of an assignment
    #[derive(Default)]
    pub enum TaskStatus {
        #[default]
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// TaskAssignment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAssignment {
    pub id: i64,
    pub application_id: i64,
    pub assigned_to_user_id: i64,
    pub assigned_by_user_id: i64,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskAssignment {
    /// Check whether `user_id` is the assignee
    #[inline]
    pub fn is_assignee(&self, user_id: i64) -> bool {
        self.assigned_to_user_id == user_id
    }

    /// Change status, stamping `completed_at` the first time it becomes completed
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == TaskStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    /// Complete the task now
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
    }
}

/// Fields needed to insert an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskAssignment {
    pub application_id: i64,
    pub assigned_to_user_id: i64,
    pub assigned_by_user_id: i64,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}
