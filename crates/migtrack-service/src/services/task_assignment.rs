//! Task assignment service
//!
//! Managers hand out follow-up tasks on an application. The assignee is
//! notified on creation and the assigner on completion.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use migtrack_core::entities::{
    NewNotification, NewTaskAssignment, NotificationType, TaskAssignment, User,
};
use migtrack_core::traits::TaskAssignmentFilter;
use migtrack_core::{DomainError, Page, PageRequest, RepoResult, UserRole};
use tracing::{info, instrument, warn};

use crate::dto::{
    CreateTaskAssignmentRequest, MyTasksQuery, TaskAssignmentListQuery, TaskAssignmentResponse,
    UpdateTaskAssignmentRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Task assignment service
pub struct TaskAssignmentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TaskAssignmentService<'a> {
    /// Create a new TaskAssignmentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Assign a task (manager+)
    #[instrument(skip(self, request), fields(assignee = request.assigned_to_user_id))]
    pub async fn create_task(
        &self,
        user_id: i64,
        request: CreateTaskAssignmentRequest,
    ) -> ServiceResult<TaskAssignmentResponse> {
        let actor = PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let application = self
            .ctx
            .application_repo()
            .find_by_id(request.application_id)
            .await?
            .ok_or(DomainError::ApplicationNotFound(request.application_id))?;

        self.ctx
            .user_repo()
            .find_by_id(request.assigned_to_user_id)
            .await?
            .ok_or(DomainError::UserNotFound(request.assigned_to_user_id))?;

        let new_task = NewTaskAssignment {
            application_id: request.application_id,
            assigned_to_user_id: request.assigned_to_user_id,
            assigned_by_user_id: actor.id,
            task_type: request.task_type,
            title: request.title,
            description: request.description,
            priority: request.priority,
            due_date: request.due_date,
        };
        let task = self
            .ctx
            .task_assignment_repo()
            .create(&new_task, actor.id)
            .await?;

        info!(task_id = task.id, "Task assigned");

        self.notify(NewNotification::new(
            task.assigned_to_user_id,
            NotificationType::Info,
            format!("New task assigned: {}", task.title),
            format!(
                "{} assigned you a task on {} ({})",
                actor.display_name(),
                application.app_name,
                application.l2_id
            ),
        ))
        .await;

        Ok(TaskAssignmentResponse::from(task))
    }

    /// Get a task by ID
    #[instrument(skip(self))]
    pub async fn get_task(&self, user_id: i64, task_id: i64) -> ServiceResult<TaskAssignmentResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;
        let task = self.find(task_id).await?;
        Ok(TaskAssignmentResponse::from(task))
    }

    /// Partially update a task (manager+ or the assignee)
    #[instrument(skip(self, request))]
    pub async fn update_task(
        &self,
        user_id: i64,
        task_id: i64,
        request: UpdateTaskAssignmentRequest,
    ) -> ServiceResult<TaskAssignmentResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        ensure_participant(&actor, &self.find(task_id).await?)?;

        let was_completed = AtomicBool::new(false);
        let patch = |task: &mut TaskAssignment| -> RepoResult<()> {
            was_completed.store(task.completed_at.is_some(), Ordering::Relaxed);
            apply_update(task, request.clone());
            Ok(())
        };
        let task = self
            .ctx
            .task_assignment_repo()
            .update(task_id, &patch, actor.id)
            .await?;

        info!(task_id, status = %task.status, "Task updated");

        if !was_completed.into_inner() && task.completed_at.is_some() {
            self.notify_completed(&task).await;
        }

        Ok(TaskAssignmentResponse::from(task))
    }

    /// Delete a task (manager+)
    #[instrument(skip(self))]
    pub async fn delete_task(&self, user_id: i64, task_id: i64) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        self.ctx.task_assignment_repo().delete(task_id, user_id).await?;

        info!(task_id, "Task deleted");
        Ok(())
    }

    /// Filtered page of tasks, newest first
    #[instrument(skip(self, query))]
    pub async fn list_tasks(
        &self,
        user_id: i64,
        query: TaskAssignmentListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<TaskAssignmentResponse>> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let filter = TaskAssignmentFilter::from(query);
        let (tasks, total) = self.ctx.task_assignment_repo().list(&filter, page).await?;

        Ok(Page::new(tasks, total, page).map(TaskAssignmentResponse::from))
    }

    /// The caller's own assignments
    #[instrument(skip(self))]
    pub async fn my_tasks(
        &self,
        user_id: i64,
        query: MyTasksQuery,
    ) -> ServiceResult<Vec<TaskAssignmentResponse>> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;

        let tasks = self
            .ctx
            .task_assignment_repo()
            .find_for_assignee(actor.id, query.status, query.limit.map(i64::from))
            .await?;

        Ok(tasks.into_iter().map(TaskAssignmentResponse::from).collect())
    }

    /// Mark a task completed now (manager+ or the assignee)
    #[instrument(skip(self))]
    pub async fn complete_task(
        &self,
        user_id: i64,
        task_id: i64,
    ) -> ServiceResult<TaskAssignmentResponse> {
        let actor = PermissionService::new(self.ctx).actor(user_id).await?;
        ensure_participant(&actor, &self.find(task_id).await?)?;

        let patch = |task: &mut TaskAssignment| -> RepoResult<()> {
            task.mark_completed(Utc::now());
            Ok(())
        };
        let task = self
            .ctx
            .task_assignment_repo()
            .update(task_id, &patch, actor.id)
            .await?;

        info!(task_id, "Task completed");

        self.notify_completed(&task).await;

        Ok(TaskAssignmentResponse::from(task))
    }

    async fn find(&self, task_id: i64) -> ServiceResult<TaskAssignment> {
        self.ctx
            .task_assignment_repo()
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("TaskAssignment", task_id.to_string()))
    }

    async fn notify_completed(&self, task: &TaskAssignment) {
        self.notify(NewNotification::new(
            task.assigned_by_user_id,
            NotificationType::Success,
            format!("Task completed: {}", task.title),
            format!("Task #{} has been completed", task.id),
        ))
        .await;
    }

    /// Best effort; a failed notification never fails the request
    async fn notify(&self, notification: NewNotification) {
        if let Err(e) = self.ctx.notification_repo().create(&notification).await {
            warn!(
                user_id = notification.user_id,
                error = %e,
                "Failed to create notification"
            );
        }
    }
}

/// Managers may change any task; others only their own
fn ensure_participant(actor: &User, task: &TaskAssignment) -> ServiceResult<()> {
    if actor.has_role(UserRole::Manager) || task.is_assignee(actor.id) {
        Ok(())
    } else {
        Err(DomainError::NotTaskParticipant.into())
    }
}

fn apply_update(task: &mut TaskAssignment, request: UpdateTaskAssignmentRequest) {
    if let Some(task_type) = request.task_type {
        task.task_type = task_type;
    }
    if let Some(title) = request.title {
        task.title = title;
    }
    if let Some(description) = request.description {
        task.description = Some(description);
    }
    if let Some(priority) = request.priority {
        task.priority = priority;
    }
    if let Some(due_date) = request.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(status) = request.status {
        task.set_status(status, Utc::now());
    }
}
