//! Application service
//!
//! CRUD over tracked applications. Progress, status rollup and delay are
//! recomputed by the subtask writes, not here.

use chrono::Utc;
use migtrack_core::entities::{Application, NewApplication};
use migtrack_core::traits::ApplicationFilter;
use migtrack_core::{DomainError, Page, PageRequest, RepoResult, UserRole};
use tracing::{info, instrument};

use crate::dto::{
    ApplicationListQuery, ApplicationResponse, CreateApplicationRequest, SubTaskResponse,
    UpdateApplicationRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Application service
pub struct ApplicationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ApplicationService<'a> {
    /// Create a new ApplicationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an application (editor+)
    #[instrument(skip(self, request), fields(l2_id = %request.l2_id))]
    pub async fn create_application(
        &self,
        user_id: i64,
        request: CreateApplicationRequest,
    ) -> ServiceResult<ApplicationResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Editor)
            .await?;

        if self
            .ctx
            .application_repo()
            .find_by_l2_id(&request.l2_id)
            .await?
            .is_some()
        {
            return Err(DomainError::L2IdAlreadyExists(request.l2_id).into());
        }

        let new_application = NewApplication {
            l2_id: request.l2_id,
            app_name: request.app_name,
            supervision_year: request.supervision_year,
            transformation_target: request.transformation_target,
            current_stage: request.current_stage,
            overall_status: request.overall_status.unwrap_or_default(),
            responsible_team: request.responsible_team,
            responsible_person: request.responsible_person,
            planned_requirement_date: request.planned_requirement_date,
            planned_release_date: request.planned_release_date,
            planned_tech_online_date: request.planned_tech_online_date,
            planned_biz_online_date: request.planned_biz_online_date,
            notes: request.notes,
        };

        let application = self
            .ctx
            .application_repo()
            .create(&new_application, user_id)
            .await?;

        info!(application_id = application.id, "Application created");

        Ok(ApplicationResponse::from(application))
    }

    /// Get an application by ID
    #[instrument(skip(self))]
    pub async fn get_application(
        &self,
        user_id: i64,
        application_id: i64,
    ) -> ServiceResult<ApplicationResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;
        let application = self.find(application_id).await?;
        Ok(ApplicationResponse::from(application))
    }

    /// Partially update an application (editor+)
    #[instrument(skip(self, request))]
    pub async fn update_application(
        &self,
        user_id: i64,
        application_id: i64,
        request: UpdateApplicationRequest,
    ) -> ServiceResult<ApplicationResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Editor)
            .await?;

        if let Some(l2_id) = &request.l2_id {
            let holder = self.ctx.application_repo().find_by_l2_id(l2_id).await?;
            if holder.is_some_and(|other| other.id != application_id) {
                return Err(DomainError::L2IdAlreadyExists(l2_id.clone()).into());
            }
        }

        let patch = |application: &mut Application| -> RepoResult<()> {
            apply_update(application, request.clone());
            Ok(())
        };
        let application = self
            .ctx
            .application_repo()
            .update(application_id, &patch, user_id)
            .await?;

        info!(application_id, "Application updated");

        Ok(ApplicationResponse::from(application))
    }

    /// Delete an application with its subtasks and assignments (manager+)
    #[instrument(skip(self))]
    pub async fn delete_application(&self, user_id: i64, application_id: i64) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        self.ctx
            .application_repo()
            .delete(application_id, user_id)
            .await?;

        info!(application_id, "Application deleted");
        Ok(())
    }

    /// Filtered, sorted page of applications
    #[instrument(skip(self, query))]
    pub async fn list_applications(
        &self,
        user_id: i64,
        query: ApplicationListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<ApplicationResponse>> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let filter = ApplicationFilter::from(query);
        let (applications, total) = self.ctx.application_repo().list(&filter, page).await?;

        Ok(Page::new(applications, total, page).map(ApplicationResponse::from))
    }

    /// All subtasks of one application
    #[instrument(skip(self))]
    pub async fn list_subtasks(
        &self,
        user_id: i64,
        application_id: i64,
    ) -> ServiceResult<Vec<SubTaskResponse>> {
        PermissionService::new(self.ctx).actor(user_id).await?;
        self.find(application_id).await?;

        let today = Utc::now().date_naive();
        let subtasks = self
            .ctx
            .subtask_repo()
            .find_by_application(application_id)
            .await?;

        Ok(subtasks
            .into_iter()
            .map(|task| SubTaskResponse::at(task, today))
            .collect())
    }

    async fn find(&self, application_id: i64) -> ServiceResult<Application> {
        self.ctx
            .application_repo()
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application", application_id.to_string()))
    }
}

/// Copy every present field of `request` onto `application`
fn apply_update(application: &mut Application, request: UpdateApplicationRequest) {
    macro_rules! set {
        ($($field:ident),+ $(,)?) => {
            $(if let Some(value) = request.$field {
                application.$field = value;
            })+
        };
    }
    macro_rules! set_optional {
        ($($field:ident),+ $(,)?) => {
            $(if let Some(value) = request.$field {
                application.$field = Some(value);
            })+
        };
    }

    set!(
        l2_id,
        app_name,
        supervision_year,
        transformation_target,
        overall_status,
        responsible_team,
    );
    set_optional!(
        current_stage,
        responsible_person,
        planned_requirement_date,
        planned_release_date,
        planned_tech_online_date,
        planned_biz_online_date,
        actual_requirement_date,
        actual_release_date,
        actual_tech_online_date,
        actual_biz_online_date,
        notes,
    );
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use migtrack_core::entities::{ApplicationStatus, TransformationTarget};

    use super::*;

    fn application() -> Application {
        let now = Utc::now();
        Application {
            id: 1,
            l2_id: "L2-0001".to_string(),
            app_name: "Payments".to_string(),
            supervision_year: 2024,
            transformation_target: TransformationTarget::Ak,
            is_ak_completed: false,
            is_cloud_native_completed: false,
            current_stage: Some("design".to_string()),
            overall_status: ApplicationStatus::NotStarted,
            responsible_team: "core".to_string(),
            responsible_person: None,
            progress_percentage: 0,
            planned_requirement_date: None,
            planned_release_date: None,
            planned_tech_online_date: None,
            planned_biz_online_date: None,
            actual_requirement_date: None,
            actual_release_date: None,
            actual_tech_online_date: None,
            actual_biz_online_date: None,
            is_delayed: false,
            delay_days: 0,
            notes: None,
            created_by: 1,
            updated_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_update_is_partial() {
        let mut app = application();
        let planned = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        apply_update(
            &mut app,
            UpdateApplicationRequest {
                app_name: Some("Payments v2".to_string()),
                planned_biz_online_date: Some(planned),
                ..Default::default()
            },
        );

        assert_eq!(app.app_name, "Payments v2");
        assert_eq!(app.planned_biz_online_date, Some(planned));
        assert_eq!(app.l2_id, "L2-0001");
        assert_eq!(app.current_stage.as_deref(), Some("design"));
        assert_eq!(app.responsible_team, "core");
    }
}
