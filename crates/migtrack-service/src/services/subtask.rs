//! SubTask service
//!
//! Subtask CRUD. Setting `task_status` fills in progress from the status
//! table; the repository recomputes the parent application on every write.

use chrono::Utc;
use migtrack_core::entities::{NewSubTask, SubTask, SubTaskStatus};
use migtrack_core::traits::SubTaskFilter;
use migtrack_core::{DomainError, Page, PageRequest, RepoResult, UserRole};
use tracing::{info, instrument};

use crate::dto::{CreateSubTaskRequest, SubTaskListQuery, SubTaskResponse, UpdateSubTaskRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

const DEFAULT_PRIORITY: i32 = 1;

/// SubTask service
pub struct SubTaskService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SubTaskService<'a> {
    /// Create a new SubTaskService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a subtask under an existing application (editor+)
    #[instrument(skip(self, request), fields(application_id = request.application_id))]
    pub async fn create_subtask(
        &self,
        user_id: i64,
        request: CreateSubTaskRequest,
    ) -> ServiceResult<SubTaskResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Editor)
            .await?;
        self.ensure_application(request.application_id).await?;

        let new_subtask = new_subtask(request);
        let subtask = self.ctx.subtask_repo().create(&new_subtask, user_id).await?;

        info!(subtask_id = subtask.id, status = %subtask.task_status, "Subtask created");

        Ok(SubTaskResponse::from(subtask))
    }

    /// Get a subtask by ID
    #[instrument(skip(self))]
    pub async fn get_subtask(&self, user_id: i64, subtask_id: i64) -> ServiceResult<SubTaskResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;
        let subtask = self.find(subtask_id).await?;
        Ok(SubTaskResponse::from(subtask))
    }

    /// Partially update a subtask (editor+)
    #[instrument(skip(self, request))]
    pub async fn update_subtask(
        &self,
        user_id: i64,
        subtask_id: i64,
        request: UpdateSubTaskRequest,
    ) -> ServiceResult<SubTaskResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Editor)
            .await?;

        if let Some(application_id) = request.application_id {
            self.ensure_application(application_id).await?;
        }

        let patch = |subtask: &mut SubTask| -> RepoResult<()> {
            apply_update(subtask, request.clone());
            Ok(())
        };
        let subtask = self
            .ctx
            .subtask_repo()
            .update(subtask_id, &patch, user_id)
            .await?;

        info!(subtask_id, status = %subtask.task_status, "Subtask updated");

        Ok(SubTaskResponse::from(subtask))
    }

    /// Delete a subtask (manager+)
    #[instrument(skip(self))]
    pub async fn delete_subtask(&self, user_id: i64, subtask_id: i64) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        self.ctx.subtask_repo().delete(subtask_id, user_id).await?;

        info!(subtask_id, "Subtask deleted");
        Ok(())
    }

    /// Filtered page of subtasks
    #[instrument(skip(self, query))]
    pub async fn list_subtasks(
        &self,
        user_id: i64,
        query: SubTaskListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<SubTaskResponse>> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let filter = SubTaskFilter::from(query);
        let (subtasks, total) = self.ctx.subtask_repo().list(&filter, page).await?;

        let today = Utc::now().date_naive();
        Ok(Page::new(subtasks, total, page).map(|task| SubTaskResponse::at(task, today)))
    }

    async fn find(&self, subtask_id: i64) -> ServiceResult<SubTask> {
        self.ctx
            .subtask_repo()
            .find_by_id(subtask_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("SubTask", subtask_id.to_string()))
    }

    async fn ensure_application(&self, application_id: i64) -> ServiceResult<()> {
        match self.ctx.application_repo().find_by_id(application_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::ApplicationNotFound(application_id).into()),
        }
    }
}

/// Build the insert, deriving progress and the blocked flag from the status
/// unless they were given
fn new_subtask(request: CreateSubTaskRequest) -> NewSubTask {
    let status = request.task_status.unwrap_or_default();
    NewSubTask {
        application_id: request.application_id,
        module_name: request.module_name,
        sub_target: request.sub_target,
        version_name: request.version_name,
        task_status: status,
        progress_percentage: request
            .progress_percentage
            .or(status.default_progress())
            .unwrap_or(0),
        is_blocked: request
            .is_blocked
            .unwrap_or(status == SubTaskStatus::Blocked),
        block_reason: request.block_reason,
        planned_requirement_date: request.planned_requirement_date,
        planned_release_date: request.planned_release_date,
        planned_tech_online_date: request.planned_tech_online_date,
        planned_biz_online_date: request.planned_biz_online_date,
        actual_requirement_date: request.actual_requirement_date,
        actual_release_date: request.actual_release_date,
        actual_tech_online_date: request.actual_tech_online_date,
        actual_biz_online_date: request.actual_biz_online_date,
        requirements: request.requirements,
        technical_notes: request.technical_notes,
        priority: request.priority.unwrap_or(DEFAULT_PRIORITY),
        estimated_hours: request.estimated_hours,
        actual_hours: request.actual_hours,
        assigned_to: request.assigned_to,
        reviewer: request.reviewer,
    }
}

/// Copy present fields, then let a status change set progress and blocked
fn apply_update(subtask: &mut SubTask, request: UpdateSubTaskRequest) {
    let status = request.task_status;
    let blocked = request.is_blocked;

    macro_rules! set {
        ($($field:ident),+ $(,)?) => {
            $(if let Some(value) = request.$field {
                subtask.$field = value;
            })+
        };
    }
    macro_rules! set_optional {
        ($($field:ident),+ $(,)?) => {
            $(if let Some(value) = request.$field {
                subtask.$field = Some(value);
            })+
        };
    }

    set!(application_id, module_name, sub_target, progress_percentage, priority);
    set_optional!(
        version_name,
        block_reason,
        planned_requirement_date,
        planned_release_date,
        planned_tech_online_date,
        planned_biz_online_date,
        actual_requirement_date,
        actual_release_date,
        actual_tech_online_date,
        actual_biz_online_date,
        requirements,
        technical_notes,
        estimated_hours,
        actual_hours,
        assigned_to,
        reviewer,
    );

    match (status, blocked) {
        (Some(status), blocked) => subtask.apply_status(status, blocked),
        (None, Some(blocked)) => subtask.is_blocked = blocked,
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use migtrack_core::entities::TransformationTarget;

    use super::*;

    fn create_request(status: Option<SubTaskStatus>) -> CreateSubTaskRequest {
        CreateSubTaskRequest {
            application_id: 1,
            module_name: "ledger".to_string(),
            sub_target: TransformationTarget::Ak,
            version_name: None,
            task_status: status,
            progress_percentage: None,
            is_blocked: None,
            block_reason: None,
            planned_requirement_date: None,
            planned_release_date: None,
            planned_tech_online_date: None,
            planned_biz_online_date: None,
            actual_requirement_date: None,
            actual_release_date: None,
            actual_tech_online_date: None,
            actual_biz_online_date: None,
            requirements: None,
            technical_notes: None,
            priority: None,
            estimated_hours: None,
            actual_hours: None,
            assigned_to: None,
            reviewer: None,
        }
    }

    fn stored(status: SubTaskStatus, progress: i32) -> SubTask {
        let now = Utc::now();
        let new = new_subtask(create_request(Some(status)));
        SubTask {
            id: 9,
            application_id: new.application_id,
            module_name: new.module_name,
            sub_target: new.sub_target,
            version_name: None,
            task_status: status,
            progress_percentage: progress,
            is_blocked: new.is_blocked,
            block_reason: None,
            planned_requirement_date: None,
            planned_release_date: None,
            planned_tech_online_date: None,
            planned_biz_online_date: None,
            actual_requirement_date: None,
            actual_release_date: None,
            actual_tech_online_date: None,
            actual_biz_online_date: None,
            requirements: None,
            technical_notes: None,
            priority: 1,
            estimated_hours: None,
            actual_hours: None,
            assigned_to: None,
            reviewer: None,
            created_by: 1,
            updated_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_subtask_defaults() {
        let new = new_subtask(create_request(None));
        assert_eq!(new.task_status, SubTaskStatus::NotStarted);
        assert_eq!(new.progress_percentage, 0);
        assert!(!new.is_blocked);
        assert_eq!(new.priority, DEFAULT_PRIORITY);

        let new = new_subtask(create_request(Some(SubTaskStatus::Testing)));
        assert_eq!(new.progress_percentage, 60);

        let new = new_subtask(create_request(Some(SubTaskStatus::Blocked)));
        assert_eq!(new.progress_percentage, 0);
        assert!(new.is_blocked);
    }

    #[test]
    fn test_update_status_fills_progress() {
        let mut task = stored(SubTaskStatus::DevInProgress, 30);
        apply_update(
            &mut task,
            UpdateSubTaskRequest {
                task_status: Some(SubTaskStatus::DeploymentReady),
                progress_percentage: Some(10),
                ..Default::default()
            },
        );
        assert_eq!(task.task_status, SubTaskStatus::DeploymentReady);
        assert_eq!(task.progress_percentage, 80, "status table wins over explicit progress");
    }

    #[test]
    fn test_update_blocked_keeps_progress() {
        let mut task = stored(SubTaskStatus::Testing, 60);
        apply_update(
            &mut task,
            UpdateSubTaskRequest {
                task_status: Some(SubTaskStatus::Blocked),
                block_reason: Some("waiting on DBA".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(task.progress_percentage, 60);
        assert!(task.is_blocked);
        assert_eq!(task.block_reason.as_deref(), Some("waiting on DBA"));
    }

    #[test]
    fn test_update_without_status_keeps_it() {
        let mut task = stored(SubTaskStatus::Testing, 60);
        apply_update(
            &mut task,
            UpdateSubTaskRequest {
                is_blocked: Some(true),
                progress_percentage: Some(65),
                ..Default::default()
            },
        );
        assert_eq!(task.task_status, SubTaskStatus::Testing);
        assert_eq!(task.progress_percentage, 65);
        assert!(task.is_blocked);
    }
}
