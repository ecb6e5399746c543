//! PostgreSQL implementation of TaskAssignmentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use migtrack_core::audit::AuditTable;
use migtrack_core::entities::{NewTaskAssignment, TaskAssignment, TaskStatus};
use migtrack_core::error::DomainError;
use migtrack_core::traits::{Patch, RepoResult, TaskAssignmentFilter, TaskAssignmentRepository};
use migtrack_core::value_objects::PageRequest;

use crate::models::TaskAssignmentModel;

use super::audit_trail::{delete_recorded, lock_snapshot, record_changes, record_created};
use super::error::{map_db_error, map_fk_violation, task_assignment_not_found, to_total};

const FILTER_CLAUSE: &str = r"
    WHERE ($1::bigint IS NULL OR assigned_to_user_id = $1)
      AND ($2::bigint IS NULL OR assigned_by_user_id = $2)
      AND ($3::bigint IS NULL OR application_id = $3)
      AND ($4::text IS NULL OR status = $4)
      AND ($5::text IS NULL OR priority = $5)
      AND ($6::text IS NULL OR task_type = $6)
";

fn missing_reference(message: &str) -> DomainError {
    DomainError::ValidationError(format!("Referenced record does not exist: {message}"))
}

/// PostgreSQL implementation of TaskAssignmentRepository
#[derive(Clone)]
pub struct PgTaskAssignmentRepository {
    pool: PgPool,
}

impl PgTaskAssignmentRepository {
    /// Create a new PgTaskAssignmentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskAssignmentRepository for PgTaskAssignmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<TaskAssignment>> {
        let result = sqlx::query_as::<_, TaskAssignmentModel>(
            r"
            SELECT * FROM task_assignments WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(TaskAssignment::from))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &TaskAssignmentFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<TaskAssignment>, u64)> {
        let status = filter.status.map(|s| s.as_str());
        let priority = filter.priority.map(|p| p.as_str());
        let task_type = filter.task_type.map(|t| t.as_str());

        let sql = format!(
            "SELECT * FROM task_assignments {FILTER_CLAUSE} ORDER BY created_at DESC, id DESC LIMIT $7 OFFSET $8"
        );
        let models = sqlx::query_as::<_, TaskAssignmentModel>(&sql)
            .bind(filter.assigned_to_user_id)
            .bind(filter.assigned_by_user_id)
            .bind(filter.application_id)
            .bind(status)
            .bind(priority)
            .bind(task_type)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM task_assignments {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.assigned_to_user_id)
            .bind(filter.assigned_by_user_id)
            .bind(filter.application_id)
            .bind(status)
            .bind(priority)
            .bind(task_type)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((
            models.into_iter().map(TaskAssignment::from).collect(),
            to_total(total),
        ))
    }

    #[instrument(skip(self))]
    async fn find_for_assignee(
        &self,
        user_id: i64,
        status: Option<TaskStatus>,
        limit: Option<i64>,
    ) -> RepoResult<Vec<TaskAssignment>> {
        let models = sqlx::query_as::<_, TaskAssignmentModel>(
            r"
            SELECT * FROM task_assignments
            WHERE assigned_to_user_id = $1
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            ",
        )
        .bind(user_id)
        .bind(status.map(TaskStatus::as_str))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(TaskAssignment::from).collect())
    }

    #[instrument(skip(self, task), fields(assignee = task.assigned_to_user_id))]
    async fn create(&self, task: &NewTaskAssignment, actor: i64) -> RepoResult<TaskAssignment> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let model = sqlx::query_as::<_, TaskAssignmentModel>(
            r"
            INSERT INTO task_assignments (
                application_id, assigned_to_user_id, assigned_by_user_id, task_type,
                title, description, priority, due_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(task.application_id)
        .bind(task.assigned_to_user_id)
        .bind(task.assigned_by_user_id)
        .bind(task.task_type.as_str())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, missing_reference))?;

        record_created(&mut tx, AuditTable::TaskAssignments, model.id, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(TaskAssignment::from(model))
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: i64,
        patch: Patch<'_, TaskAssignment>,
        actor: i64,
    ) -> RepoResult<TaskAssignment> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let before = lock_snapshot(&mut tx, AuditTable::TaskAssignments, id)
            .await?
            .ok_or_else(|| task_assignment_not_found(id))?;

        let current = sqlx::query_as::<_, TaskAssignmentModel>(
            r"
            SELECT * FROM task_assignments WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let mut task = TaskAssignment::from(current);
        patch(&mut task)?;

        let model = sqlx::query_as::<_, TaskAssignmentModel>(
            r"
            UPDATE task_assignments
            SET assigned_to_user_id = $2, task_type = $3, title = $4, description = $5,
                priority = $6, due_date = $7, status = $8, completed_at = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(task.id)
        .bind(task.assigned_to_user_id)
        .bind(task.task_type.as_str())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.status.as_str())
        .bind(task.completed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, missing_reference))?;

        record_changes(&mut tx, AuditTable::TaskAssignments, id, &before, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(TaskAssignment::from(model))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if !delete_recorded(&mut tx, AuditTable::TaskAssignments, id, actor).await? {
            return Err(task_assignment_not_found(id));
        }
        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgTaskAssignmentRepository>();
    }

    #[test]
    fn test_missing_reference_is_validation() {
        assert!(missing_reference("fk").is_validation());
    }
}
