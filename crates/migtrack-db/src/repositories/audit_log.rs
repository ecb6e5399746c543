//! PostgreSQL implementation of AuditLogRepository
//!
//! Rollback runs as one transaction: load the entry, lock the target row,
//! check for later changes, apply the planned compensating write and append
//! the ROLLBACK entry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use migtrack_core::audit::{plan_rollback, rollback_target, AuditTable, RollbackAction};
use migtrack_core::entities::{AuditLog, NewAuditLog};
use migtrack_core::error::DomainError;
use migtrack_core::traits::{
    AuditLogFilter, AuditLogRepository, AuditStatistics, AuditWindow, RepoResult, RollbackOutcome,
    UserCount,
};
use migtrack_core::value_objects::PageRequest;

use crate::models::AuditLogModel;

use super::audit_trail::{lock_snapshot, snapshot, write_entry};
use super::error::{audit_log_not_found, map_db_error, to_total};

const FILTER_CLAUSE: &str = r"
    WHERE ($1::text IS NULL OR table_name = $1)
      AND ($2::bigint IS NULL OR record_id = $2)
      AND ($3::text IS NULL OR operation = $3)
      AND ($4::bigint IS NULL OR user_id = $4)
";

const WINDOW_CLAUSE: &str = r"
    WHERE ($1::timestamptz IS NULL OR created_at >= $1)
      AND ($2::timestamptz IS NULL OR created_at < $2)
";

/// PostgreSQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new PgAuditLogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<AuditLog>> {
        let result = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT * FROM audit_logs WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(AuditLog::from))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &AuditLogFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<AuditLog>, u64)> {
        let operation = filter.operation.map(|o| o.as_str());

        let sql = format!(
            "SELECT * FROM audit_logs {FILTER_CLAUSE} ORDER BY id DESC LIMIT $5 OFFSET $6"
        );
        let models = sqlx::query_as::<_, AuditLogModel>(&sql)
            .bind(&filter.table_name)
            .bind(filter.record_id)
            .bind(operation)
            .bind(filter.user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM audit_logs {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&filter.table_name)
            .bind(filter.record_id)
            .bind(operation)
            .bind(filter.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((models.into_iter().map(AuditLog::from).collect(), to_total(total)))
    }

    #[instrument(skip(self))]
    async fn history(&self, table_name: &str, record_id: i64) -> RepoResult<Vec<AuditLog>> {
        let models = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT * FROM audit_logs
            WHERE table_name = $1 AND record_id = $2
            ORDER BY id ASC
            ",
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(AuditLog::from).collect())
    }

    #[instrument(skip(self))]
    async fn statistics(
        &self,
        window: AuditWindow,
        hourly: AuditWindow,
        top_users: i64,
    ) -> RepoResult<AuditStatistics> {
        let by_operation = counts_by(&self.pool, "operation", window).await?;
        let by_table = counts_by(&self.pool, "table_name", window).await?;

        let users_sql = format!(
            "SELECT user_id, COUNT(*) FROM audit_logs {WINDOW_CLAUSE} AND user_id IS NOT NULL \
             GROUP BY user_id ORDER BY COUNT(*) DESC, user_id ASC LIMIT $3"
        );
        let top_users = sqlx::query_as::<_, (i64, i64)>(&users_sql)
            .bind(window.since)
            .bind(window.before)
            .bind(top_users)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(|(user_id, count)| UserCount {
                user_id,
                count: to_total(count),
            })
            .collect();

        let hourly_sql = format!(
            "SELECT EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::int4, COUNT(*) \
             FROM audit_logs {WINDOW_CLAUSE} GROUP BY 1"
        );
        let activity_by_hour = sqlx::query_as::<_, (i32, i64)>(&hourly_sql)
            .bind(hourly.since)
            .bind(hourly.before)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(|(hour, count)| (hour.clamp(0, 23) as u32, to_total(count)))
            .collect();

        Ok(AuditStatistics {
            total_logs: by_operation.values().sum(),
            by_operation,
            by_table,
            top_users,
            activity_by_hour,
        })
    }

    #[instrument(skip(self))]
    async fn user_activity(
        &self,
        user_id: i64,
        window: AuditWindow,
        limit: i64,
    ) -> RepoResult<Vec<AuditLog>> {
        let models = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT * FROM audit_logs
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY id DESC
            LIMIT $4
            ",
        )
        .bind(user_id)
        .bind(window.since)
        .bind(window.before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(AuditLog::from).collect())
    }

    #[instrument(skip(self, reason))]
    async fn rollback(
        &self,
        log_id: i64,
        actor: i64,
        reason: Option<String>,
    ) -> RepoResult<RollbackOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let log = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT * FROM audit_logs WHERE id = $1
            ",
        )
        .bind(log_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(AuditLog::from)
        .ok_or_else(|| audit_log_not_found(log_id))?;

        let table = rollback_target(&log)?;
        let current = lock_snapshot(&mut tx, table, log.record_id).await?;

        let has_later_changes = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM audit_logs
                WHERE table_name = $1 AND record_id = $2 AND id > $3
            )
            ",
        )
        .bind(table.table_name())
        .bind(log.record_id)
        .bind(log.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let action = plan_rollback(&log, current.as_ref(), has_later_changes)?;

        let (entry, restored_record) = match action {
            RollbackAction::Restore { values } => {
                restore_columns(&mut tx, table, log.record_id, &values).await?;
                let after = snapshot(&mut tx, table, log.record_id).await?;
                let old_values = pick(current.as_ref(), &values);
                let new_values = pick(after.as_ref(), &values);
                let entry = NewAuditLog::rollback(
                    table,
                    log.record_id,
                    log.id,
                    Some(old_values),
                    Some(new_values),
                    actor,
                    reason,
                );
                (entry, after)
            }
            RollbackAction::Reinsert { row } => {
                reinsert_row(&mut tx, table, log.record_id, row).await?;
                let after = snapshot(&mut tx, table, log.record_id).await?;
                let entry = NewAuditLog::rollback(
                    table,
                    log.record_id,
                    log.id,
                    None,
                    after.clone(),
                    actor,
                    reason,
                );
                (entry, after)
            }
            RollbackAction::Remove => {
                remove_row(&mut tx, table, log.record_id).await?;
                let entry = NewAuditLog::rollback(
                    table,
                    log.record_id,
                    log.id,
                    current,
                    None,
                    actor,
                    reason,
                );
                (entry, None)
            }
        };

        let rollback_log = AuditLog::from(write_entry(&mut tx, &entry).await?);
        tx.commit().await.map_err(map_db_error)?;

        info!(
            audit_id = log.id,
            rollback_id = rollback_log.id,
            table = table.table_name(),
            record_id = log.record_id,
            operation = %log.operation,
            "Audit entry rolled back"
        );

        Ok(RollbackOutcome {
            log,
            rollback_log,
            restored_record,
        })
    }
}

/// Entry counts grouped by one text column of `audit_logs`
async fn counts_by(
    pool: &PgPool,
    column: &'static str,
    window: AuditWindow,
) -> RepoResult<BTreeMap<String, u64>> {
    let sql = format!("SELECT {column}, COUNT(*) FROM audit_logs {WINDOW_CLAUSE} GROUP BY {column}");
    let rows = sqlx::query_as::<_, (String, i64)>(&sql)
        .bind(window.since)
        .bind(window.before)
        .fetch_all(pool)
        .await
        .map_err(map_db_error)?;

    Ok(rows
        .into_iter()
        .map(|(key, count)| (key, to_total(count)))
        .collect())
}

/// Unique violation while writing old values back onto a live row
fn restored_value_taken(table: AuditTable, values: &Map<String, Value>, detail: &str) -> DomainError {
    match (table, values.get("l2_id")) {
        (AuditTable::Applications, Some(Value::String(l2_id))) => {
            DomainError::L2IdAlreadyExists(l2_id.clone())
        }
        _ => DomainError::RestoreConflict(detail.to_string()),
    }
}

fn referential_conflict(e: sqlx::Error, table: AuditTable, id: i64) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return DomainError::ReferentialConflict(db_err.message().to_string());
        }
        if db_err.is_unique_violation() {
            return DomainError::RecordExists {
                table: table.table_name().to_string(),
                id,
            };
        }
    }
    map_db_error(e)
}

/// Write `values` back onto the row. Only restorable column names reach the SQL.
async fn restore_columns(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
    values: &Map<String, Value>,
) -> RepoResult<()> {
    let name = table.table_name();
    let assignments = table
        .restorable_columns()
        .iter()
        .filter(|column| values.contains_key(**column))
        .map(|column| format!("{column} = r.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {name} SET {assignments} FROM jsonb_populate_record(NULL::{name}, $1) AS r WHERE {name}.id = $2"
    );
    sqlx::query(&sql)
        .bind(Value::Object(values.clone()))
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return restored_value_taken(table, values, db_err.message());
                }
            }
            referential_conflict(e, table, id)
        })?;

    Ok(())
}

/// Insert a deleted row again under its original id
async fn reinsert_row(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
    row: Map<String, Value>,
) -> RepoResult<()> {
    let name = table.table_name();
    let sql = format!("INSERT INTO {name} SELECT * FROM jsonb_populate_record(NULL::{name}, $1)");
    sqlx::query(&sql)
        .bind(Value::Object(row))
        .execute(conn)
        .await
        .map_err(|e| referential_conflict(e, table, id))?;

    Ok(())
}

async fn remove_row(conn: &mut PgConnection, table: AuditTable, id: i64) -> RepoResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = $1", table.table_name());
    sqlx::query(&sql)
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| referential_conflict(e, table, id))?;

    Ok(())
}

/// The entries of `row` whose keys appear in `columns`
fn pick(row: Option<&Value>, columns: &Map<String, Value>) -> Value {
    let picked = columns
        .keys()
        .map(|column| {
            let value = row
                .and_then(|r| r.get(column))
                .cloned()
                .unwrap_or(Value::Null);
            (column.clone(), value)
        })
        .collect::<Map<_, _>>();
    Value::Object(picked)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAuditLogRepository>();
    }

    #[test]
    fn test_restored_value_taken() {
        let values = json!({"l2_id": "L2-7", "app_name": "x"});
        let err = restored_value_taken(
            AuditTable::Applications,
            values.as_object().unwrap(),
            "duplicate key",
        );
        assert!(matches!(err, DomainError::L2IdAlreadyExists(ref id) if id == "L2-7"));

        let values = json!({"app_name": "x"});
        let err = restored_value_taken(
            AuditTable::Applications,
            values.as_object().unwrap(),
            "duplicate key",
        );
        assert_eq!(err.code(), "RESTORE_CONFLICT");
        assert!(err.is_conflict());
        assert!(!matches!(err, DomainError::RecordExists { .. }));
    }

    #[test]
    fn test_pick_restricts_to_columns() {
        let row = json!({"app_name": "after", "notes": "n", "delay_days": 3});
        let columns = json!({"app_name": "before", "current_stage": "x"});
        let picked = pick(Some(&row), columns.as_object().unwrap());
        assert_eq!(picked, json!({"app_name": "after", "current_stage": null}));
    }

    #[test]
    fn test_pick_without_row() {
        let columns = json!({"title": "t"});
        assert_eq!(pick(None, columns.as_object().unwrap()), json!({"title": null}));
    }
}
