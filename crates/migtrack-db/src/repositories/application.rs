//! PostgreSQL implementation of ApplicationRepository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use migtrack_core::audit::AuditTable;
use migtrack_core::entities::{Application, NewApplication, SubTask};
use migtrack_core::error::DomainError;
use migtrack_core::traits::{
    ApplicationFilter, ApplicationRepository, DashboardFilter, DashboardStats, Patch, RepoResult,
};
use migtrack_core::value_objects::PageRequest;

use crate::models::{ApplicationModel, DashboardStatsModel, SubTaskModel};

use super::audit_trail::{delete_recorded, lock_snapshot, record_changes, record_created};
use super::error::{
    application_not_found, contains_pattern, map_db_error, map_unique_violation, to_total,
};

const FILTER_CLAUSE: &str = r"
    WHERE ($1::text IS NULL OR l2_id ILIKE $1)
      AND ($2::text IS NULL OR app_name ILIKE $2)
      AND ($3::text IS NULL OR overall_status = $3)
      AND ($4::text IS NULL OR responsible_team ILIKE $4)
      AND ($5::int IS NULL OR supervision_year = $5)
      AND ($6::text IS NULL OR transformation_target = $6)
      AND ($7::bool IS NULL OR is_delayed = $7)
";

/// PostgreSQL implementation of ApplicationRepository
#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    /// Create a new PgApplicationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Application>> {
        let result = sqlx::query_as::<_, ApplicationModel>(
            r"
            SELECT * FROM applications WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Application::from))
    }

    #[instrument(skip(self))]
    async fn find_by_l2_id(&self, l2_id: &str) -> RepoResult<Option<Application>> {
        let result = sqlx::query_as::<_, ApplicationModel>(
            r"
            SELECT * FROM applications WHERE l2_id = $1
            ",
        )
        .bind(l2_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Application::from))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Application>, u64)> {
        let l2_id = filter.l2_id.as_deref().map(contains_pattern);
        let app_name = filter.app_name.as_deref().map(contains_pattern);
        let status = filter.status.map(|s| s.as_str());
        let team = filter.team.as_deref().map(contains_pattern);
        let target = filter.target.map(|t| t.as_str());

        // Sort column and direction come from closed enums
        let order = filter.sort_order.keyword();
        let sql = format!(
            "SELECT * FROM applications {FILTER_CLAUSE} ORDER BY {} {order}, id {order} LIMIT $8 OFFSET $9",
            filter.sort_by.as_str(),
        );

        let models = sqlx::query_as::<_, ApplicationModel>(&sql)
            .bind(&l2_id)
            .bind(&app_name)
            .bind(status)
            .bind(&team)
            .bind(filter.year)
            .bind(target)
            .bind(filter.is_delayed)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM applications {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&l2_id)
            .bind(&app_name)
            .bind(status)
            .bind(&team)
            .bind(filter.year)
            .bind(target)
            .bind(filter.is_delayed)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((
            models.into_iter().map(Application::from).collect(),
            to_total(total),
        ))
    }

    #[instrument(skip(self, application), fields(l2_id = %application.l2_id))]
    async fn create(&self, application: &NewApplication, actor: i64) -> RepoResult<Application> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let model = sqlx::query_as::<_, ApplicationModel>(
            r"
            INSERT INTO applications (
                l2_id, app_name, supervision_year, transformation_target, current_stage,
                overall_status, responsible_team, responsible_person,
                planned_requirement_date, planned_release_date, planned_tech_online_date,
                planned_biz_online_date, notes, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING *
            ",
        )
        .bind(&application.l2_id)
        .bind(&application.app_name)
        .bind(application.supervision_year)
        .bind(application.transformation_target.as_str())
        .bind(&application.current_stage)
        .bind(application.overall_status.as_str())
        .bind(&application.responsible_team)
        .bind(&application.responsible_person)
        .bind(application.planned_requirement_date)
        .bind(application.planned_release_date)
        .bind(application.planned_tech_online_date)
        .bind(application.planned_biz_online_date)
        .bind(&application.notes)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::L2IdAlreadyExists(application.l2_id.clone()))
        })?;

        record_created(&mut tx, AuditTable::Applications, model.id, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(Application::from(model))
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: i64,
        patch: Patch<'_, Application>,
        actor: i64,
    ) -> RepoResult<Application> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let before = lock_snapshot(&mut tx, AuditTable::Applications, id)
            .await?
            .ok_or_else(|| application_not_found(id))?;

        let mut application = Application::from(locked_row(&mut tx, id).await?);
        patch(&mut application)?;

        let model = sqlx::query_as::<_, ApplicationModel>(
            r"
            UPDATE applications
            SET l2_id = $2, app_name = $3, supervision_year = $4, transformation_target = $5,
                is_ak_completed = $6, is_cloud_native_completed = $7, current_stage = $8,
                overall_status = $9, responsible_team = $10, responsible_person = $11,
                progress_percentage = $12,
                planned_requirement_date = $13, planned_release_date = $14,
                planned_tech_online_date = $15, planned_biz_online_date = $16,
                actual_requirement_date = $17, actual_release_date = $18,
                actual_tech_online_date = $19, actual_biz_online_date = $20,
                is_delayed = $21, delay_days = $22, notes = $23,
                updated_by = $24, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(application.id)
        .bind(&application.l2_id)
        .bind(&application.app_name)
        .bind(application.supervision_year)
        .bind(application.transformation_target.as_str())
        .bind(application.is_ak_completed)
        .bind(application.is_cloud_native_completed)
        .bind(&application.current_stage)
        .bind(application.overall_status.as_str())
        .bind(&application.responsible_team)
        .bind(&application.responsible_person)
        .bind(application.progress_percentage)
        .bind(application.planned_requirement_date)
        .bind(application.planned_release_date)
        .bind(application.planned_tech_online_date)
        .bind(application.planned_biz_online_date)
        .bind(application.actual_requirement_date)
        .bind(application.actual_release_date)
        .bind(application.actual_tech_online_date)
        .bind(application.actual_biz_online_date)
        .bind(application.is_delayed)
        .bind(application.delay_days)
        .bind(&application.notes)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::L2IdAlreadyExists(application.l2_id.clone()))
        })?;

        record_changes(&mut tx, AuditTable::Applications, id, &before, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(Application::from(model))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if lock_snapshot(&mut tx, AuditTable::Applications, id).await?.is_none() {
            return Err(application_not_found(id));
        }

        let subtask_ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM sub_tasks WHERE application_id = $1 ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;
        for subtask_id in &subtask_ids {
            delete_recorded(&mut tx, AuditTable::SubTasks, *subtask_id, actor).await?;
        }

        let task_ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM task_assignments WHERE application_id = $1 ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;
        for task_id in &task_ids {
            delete_recorded(&mut tx, AuditTable::TaskAssignments, *task_id, actor).await?;
        }

        delete_recorded(&mut tx, AuditTable::Applications, id, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        debug!(
            subtasks = subtask_ids.len(),
            task_assignments = task_ids.len(),
            "Application deleted with dependents"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn dashboard_stats(&self, filter: &DashboardFilter) -> RepoResult<DashboardStats> {
        let model = sqlx::query_as::<_, DashboardStatsModel>(
            r"
            SELECT
                COUNT(*) AS total_applications,
                COUNT(*) FILTER (
                    WHERE a.overall_status IN ('dev_in_progress', 'biz_online')
                ) AS active_applications,
                COUNT(*) FILTER (WHERE a.overall_status = 'completed') AS completed_applications,
                COUNT(b.application_id) AS blocked_applications,
                COUNT(*) FILTER (WHERE a.is_delayed) AS delayed_applications,
                COUNT(*) FILTER (WHERE a.is_ak_completed) AS ak_completed_applications,
                COUNT(*) FILTER (
                    WHERE a.is_cloud_native_completed
                ) AS cloud_native_completed_applications,
                COUNT(*) FILTER (
                    WHERE a.is_ak_completed AND a.is_cloud_native_completed
                ) AS both_completed_applications,
                COUNT(*) FILTER (WHERE a.transformation_target = 'ak') AS ak_target_applications,
                COUNT(*) FILTER (
                    WHERE a.transformation_target = 'cloud_native'
                ) AS cloud_native_target_applications,
                COUNT(*) FILTER (
                    WHERE a.transformation_target = 'ak' AND a.is_ak_completed
                ) AS ak_target_completed,
                COUNT(*) FILTER (
                    WHERE a.transformation_target = 'cloud_native' AND a.is_cloud_native_completed
                ) AS cloud_native_target_completed,
                COALESCE(AVG(a.progress_percentage), 0)::float8 AS average_progress,
                MAX(a.updated_at) AS last_updated
            FROM applications a
            LEFT JOIN (
                SELECT DISTINCT application_id FROM sub_tasks WHERE is_blocked
            ) b ON b.application_id = a.id
            WHERE ($1::text IS NULL OR a.responsible_team = $1)
              AND ($2::timestamptz IS NULL OR a.updated_at >= $2)
            ",
        )
        .bind(&filter.team)
        .bind(filter.updated_since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(DashboardStats::from(model))
    }
}

/// Current row of an application the caller already holds locked
async fn locked_row(conn: &mut PgConnection, id: i64) -> RepoResult<ApplicationModel> {
    sqlx::query_as::<_, ApplicationModel>(
        r"
        SELECT * FROM applications WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(map_db_error)
}

/// Recompute the derived fields of one application from its subtasks.
///
/// Runs inside the caller's transaction and audits the change as an UPDATE.
/// A missing application is left alone.
pub(crate) async fn refresh_progress(
    conn: &mut PgConnection,
    application_id: i64,
    actor: i64,
) -> RepoResult<()> {
    let Some(before) = lock_snapshot(&mut *conn, AuditTable::Applications, application_id).await?
    else {
        return Ok(());
    };

    let model = locked_row(&mut *conn, application_id).await?;

    let subtasks: Vec<SubTask> = sqlx::query_as::<_, SubTaskModel>(
        r"
        SELECT * FROM sub_tasks WHERE application_id = $1
        ",
    )
    .bind(application_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)?
    .into_iter()
    .map(SubTask::from)
    .collect();

    let mut application = Application::from(model);
    if !application.recompute_from_subtasks(&subtasks, Utc::now().date_naive()) {
        return Ok(());
    }

    sqlx::query(
        r"
        UPDATE applications
        SET progress_percentage = $2, overall_status = $3,
            is_ak_completed = $4, is_cloud_native_completed = $5,
            is_delayed = $6, delay_days = $7,
            updated_by = $8, updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(application_id)
    .bind(application.progress_percentage)
    .bind(application.overall_status.as_str())
    .bind(application.is_ak_completed)
    .bind(application.is_cloud_native_completed)
    .bind(application.is_delayed)
    .bind(application.delay_days)
    .bind(actor)
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;

    record_changes(conn, AuditTable::Applications, application_id, &before, actor).await
}
