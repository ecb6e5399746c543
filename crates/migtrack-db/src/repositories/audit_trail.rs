//! Audit entries written alongside data mutations
//!
//! Every helper here takes the open transaction's connection, so the audit row
//! commits or rolls back together with the change it describes. Table names
//! only ever come from [`AuditTable::table_name`].

use migtrack_core::audit::{diff_snapshots, AuditTable};
use migtrack_core::entities::NewAuditLog;
use migtrack_core::traits::RepoResult;
use serde_json::Value;
use sqlx::PgConnection;

use crate::models::AuditLogModel;

use super::error::map_db_error;

/// Current row as a JSON object, or `None` when it does not exist
pub(crate) async fn snapshot(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
) -> RepoResult<Option<Value>> {
    let sql = format!(
        "SELECT to_jsonb(t) FROM {} t WHERE t.id = $1",
        table.table_name()
    );
    sqlx::query_scalar::<_, Value>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)
}

/// Like [`snapshot`], holding a row lock until the transaction ends
pub(crate) async fn lock_snapshot(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
) -> RepoResult<Option<Value>> {
    let sql = format!(
        "SELECT to_jsonb(t) FROM {} t WHERE t.id = $1 FOR UPDATE",
        table.table_name()
    );
    sqlx::query_scalar::<_, Value>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)
}

/// Append one audit entry
pub(crate) async fn write_entry(
    conn: &mut PgConnection,
    entry: &NewAuditLog,
) -> RepoResult<AuditLogModel> {
    sqlx::query_as::<_, AuditLogModel>(
        r"
        INSERT INTO audit_logs (table_name, record_id, operation, old_values, new_values,
                                changed_fields, user_id, reason, rollback_of)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        ",
    )
    .bind(entry.table.table_name())
    .bind(entry.record_id)
    .bind(entry.operation.as_str())
    .bind(&entry.old_values)
    .bind(&entry.new_values)
    .bind(&entry.changed_fields)
    .bind(entry.user_id)
    .bind(&entry.reason)
    .bind(entry.rollback_of)
    .fetch_one(conn)
    .await
    .map_err(map_db_error)
}

/// Record the full row of a freshly inserted record
pub(crate) async fn record_created(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
    actor: i64,
) -> RepoResult<()> {
    if let Some(row) = snapshot(&mut *conn, table, id).await? {
        write_entry(conn, &NewAuditLog::created(table, id, row, actor)).await?;
    }
    Ok(())
}

/// Compare the row against `before` and record the changed columns, if any
pub(crate) async fn record_changes(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
    before: &Value,
    actor: i64,
) -> RepoResult<()> {
    let Some(after) = snapshot(&mut *conn, table, id).await? else {
        return Ok(());
    };
    let diff = diff_snapshots(before, &after);
    if !diff.is_empty() {
        write_entry(conn, &NewAuditLog::updated(table, id, diff, actor)).await?;
    }
    Ok(())
}

/// Delete one row and record its last state.
///
/// Returns `false` when the row does not exist.
pub(crate) async fn delete_recorded(
    conn: &mut PgConnection,
    table: AuditTable,
    id: i64,
    actor: i64,
) -> RepoResult<bool> {
    let Some(row) = lock_snapshot(&mut *conn, table, id).await? else {
        return Ok(false);
    };

    let sql = format!("DELETE FROM {} WHERE id = $1", table.table_name());
    sqlx::query(&sql)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    write_entry(conn, &NewAuditLog::deleted(table, id, row, actor)).await?;
    Ok(true)
}
