//! PostgreSQL implementation of SubTaskRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use migtrack_core::audit::AuditTable;
use migtrack_core::entities::{NewSubTask, SubTask};
use migtrack_core::traits::{Patch, RepoResult, SubTaskFilter, SubTaskRepository};
use migtrack_core::value_objects::PageRequest;

use crate::models::SubTaskModel;

use super::application::refresh_progress;
use super::audit_trail::{delete_recorded, lock_snapshot, record_changes, record_created};
use super::error::{
    application_not_found, contains_pattern, map_db_error, map_fk_violation, subtask_not_found,
    to_total,
};

const FILTER_CLAUSE: &str = r"
    WHERE ($1::bigint IS NULL OR application_id = $1)
      AND ($2::text IS NULL OR sub_target = $2)
      AND ($3::text IS NULL OR task_status = $3)
      AND ($4::bool IS NULL OR is_blocked = $4)
      AND ($5::text IS NULL OR assigned_to = $5)
      AND ($6::text IS NULL OR version_name ILIKE $6)
";

/// PostgreSQL implementation of SubTaskRepository
#[derive(Clone)]
pub struct PgSubTaskRepository {
    pool: PgPool,
}

impl PgSubTaskRepository {
    /// Create a new PgSubTaskRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubTaskRepository for PgSubTaskRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<SubTask>> {
        let result = sqlx::query_as::<_, SubTaskModel>(
            r"
            SELECT * FROM sub_tasks WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(SubTask::from))
    }

    #[instrument(skip(self))]
    async fn find_by_application(&self, application_id: i64) -> RepoResult<Vec<SubTask>> {
        let models = sqlx::query_as::<_, SubTaskModel>(
            r"
            SELECT * FROM sub_tasks
            WHERE application_id = $1
            ORDER BY priority DESC, id ASC
            ",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(SubTask::from).collect())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &SubTaskFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<SubTask>, u64)> {
        let sub_target = filter.sub_target.map(|t| t.as_str());
        let task_status = filter.task_status.map(|s| s.as_str());
        let version_name = filter.version_name.as_deref().map(contains_pattern);

        let sql = format!(
            "SELECT * FROM sub_tasks {FILTER_CLAUSE} ORDER BY updated_at DESC, id DESC LIMIT $7 OFFSET $8"
        );
        let models = sqlx::query_as::<_, SubTaskModel>(&sql)
            .bind(filter.application_id)
            .bind(sub_target)
            .bind(task_status)
            .bind(filter.is_blocked)
            .bind(&filter.assigned_to)
            .bind(&version_name)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM sub_tasks {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.application_id)
            .bind(sub_target)
            .bind(task_status)
            .bind(filter.is_blocked)
            .bind(&filter.assigned_to)
            .bind(&version_name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((models.into_iter().map(SubTask::from).collect(), to_total(total)))
    }

    #[instrument(skip(self, subtask), fields(application_id = subtask.application_id))]
    async fn create(&self, subtask: &NewSubTask, actor: i64) -> RepoResult<SubTask> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let model = sqlx::query_as::<_, SubTaskModel>(
            r"
            INSERT INTO sub_tasks (
                application_id, module_name, sub_target, version_name, task_status,
                progress_percentage, is_blocked, block_reason,
                planned_requirement_date, planned_release_date, planned_tech_online_date,
                planned_biz_online_date, actual_requirement_date, actual_release_date,
                actual_tech_online_date, actual_biz_online_date,
                requirements, technical_notes, priority, estimated_hours, actual_hours,
                assigned_to, reviewer, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $24)
            RETURNING *
            ",
        )
        .bind(subtask.application_id)
        .bind(&subtask.module_name)
        .bind(subtask.sub_target.as_str())
        .bind(&subtask.version_name)
        .bind(subtask.task_status.as_str())
        .bind(subtask.progress_percentage)
        .bind(subtask.is_blocked)
        .bind(&subtask.block_reason)
        .bind(subtask.planned_requirement_date)
        .bind(subtask.planned_release_date)
        .bind(subtask.planned_tech_online_date)
        .bind(subtask.planned_biz_online_date)
        .bind(subtask.actual_requirement_date)
        .bind(subtask.actual_release_date)
        .bind(subtask.actual_tech_online_date)
        .bind(subtask.actual_biz_online_date)
        .bind(&subtask.requirements)
        .bind(&subtask.technical_notes)
        .bind(subtask.priority)
        .bind(subtask.estimated_hours)
        .bind(subtask.actual_hours)
        .bind(&subtask.assigned_to)
        .bind(&subtask.reviewer)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, |_| application_not_found(subtask.application_id)))?;

        record_created(&mut tx, AuditTable::SubTasks, model.id, actor).await?;
        refresh_progress(&mut tx, model.application_id, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(SubTask::from(model))
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: i64, patch: Patch<'_, SubTask>, actor: i64) -> RepoResult<SubTask> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let before = lock_snapshot(&mut tx, AuditTable::SubTasks, id)
            .await?
            .ok_or_else(|| subtask_not_found(id))?;

        let current = sqlx::query_as::<_, SubTaskModel>(
            r"
            SELECT * FROM sub_tasks WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let previous_application = current.application_id;

        let mut subtask = SubTask::from(current);
        patch(&mut subtask)?;

        let model = sqlx::query_as::<_, SubTaskModel>(
            r"
            UPDATE sub_tasks
            SET application_id = $2, module_name = $3, sub_target = $4, version_name = $5,
                task_status = $6, progress_percentage = $7, is_blocked = $8, block_reason = $9,
                planned_requirement_date = $10, planned_release_date = $11,
                planned_tech_online_date = $12, planned_biz_online_date = $13,
                actual_requirement_date = $14, actual_release_date = $15,
                actual_tech_online_date = $16, actual_biz_online_date = $17,
                requirements = $18, technical_notes = $19, priority = $20,
                estimated_hours = $21, actual_hours = $22, assigned_to = $23, reviewer = $24,
                updated_by = $25, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(subtask.id)
        .bind(subtask.application_id)
        .bind(&subtask.module_name)
        .bind(subtask.sub_target.as_str())
        .bind(&subtask.version_name)
        .bind(subtask.task_status.as_str())
        .bind(subtask.progress_percentage)
        .bind(subtask.is_blocked)
        .bind(&subtask.block_reason)
        .bind(subtask.planned_requirement_date)
        .bind(subtask.planned_release_date)
        .bind(subtask.planned_tech_online_date)
        .bind(subtask.planned_biz_online_date)
        .bind(subtask.actual_requirement_date)
        .bind(subtask.actual_release_date)
        .bind(subtask.actual_tech_online_date)
        .bind(subtask.actual_biz_online_date)
        .bind(&subtask.requirements)
        .bind(&subtask.technical_notes)
        .bind(subtask.priority)
        .bind(subtask.estimated_hours)
        .bind(subtask.actual_hours)
        .bind(&subtask.assigned_to)
        .bind(&subtask.reviewer)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, |_| application_not_found(subtask.application_id)))?;

        record_changes(&mut tx, AuditTable::SubTasks, id, &before, actor).await?;

        refresh_progress(&mut tx, model.application_id, actor).await?;
        if previous_application != model.application_id {
            refresh_progress(&mut tx, previous_application, actor).await?;
        }
        tx.commit().await.map_err(map_db_error)?;

        Ok(SubTask::from(model))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let application_id = sqlx::query_scalar::<_, i64>(
            r"
            SELECT application_id FROM sub_tasks WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| subtask_not_found(id))?;

        if !delete_recorded(&mut tx, AuditTable::SubTasks, id, actor).await? {
            return Err(subtask_not_found(id));
        }
        refresh_progress(&mut tx, application_id, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
