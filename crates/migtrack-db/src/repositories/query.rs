//! PostgreSQL implementation of QueryRepository
//!
//! Ad-hoc queries run inside a `READ ONLY` transaction with a local statement
//! timeout. The statement is described first for its column names, then run
//! as a subquery whose columns are renamed `c0..cN` so that each row comes
//! back as one JSON object even when the user's column names repeat.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Column, Executor, FromRow, PgPool};
use tracing::{debug, instrument};

use migtrack_core::error::DomainError;
use migtrack_core::traits::{ColumnSchema, QueryOutput, QueryRepository, RepoResult, TableSchema};

use super::error::map_db_error;

/// Errors raised by the user's SQL are reported back as invalid queries
fn map_query_error(e: sqlx::Error) -> DomainError {
    match e.as_database_error() {
        Some(db_err) => DomainError::InvalidQuery(db_err.message().to_string()),
        None => map_db_error(e),
    }
}

fn positional_name(index: usize) -> String {
    format!("c{index}")
}

/// Wrap `sql` so every row is one JSON object keyed `c0..cN` by column position
fn positional_select(sql: &str, column_count: usize) -> String {
    if column_count == 0 {
        return format!("SELECT to_jsonb(q) FROM ({sql}) AS q LIMIT $1");
    }
    let aliases = (0..column_count)
        .map(positional_name)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT to_jsonb(q) FROM ({sql}) AS q({aliases}) LIMIT $1")
}

#[derive(Debug, FromRow)]
struct ColumnRow {
    table_name: String,
    column_name: String,
    data_type: String,
    is_nullable: String,
}

/// PostgreSQL implementation of QueryRepository
#[derive(Clone)]
pub struct PgQueryRepository {
    pool: PgPool,
}

impl PgQueryRepository {
    /// Create a new PgQueryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryRepository for PgQueryRepository {
    #[instrument(skip(self, sql))]
    async fn run_read_only(
        &self,
        sql: &str,
        max_rows: u32,
        statement_timeout_ms: u64,
    ) -> RepoResult<QueryOutput> {
        let sql = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        // SET does not take bind parameters; the value is a plain integer
        sqlx::query(&format!("SET LOCAL statement_timeout = {statement_timeout_ms}"))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let described = (&mut *tx).describe(sql).await.map_err(map_query_error)?;
        let columns: Vec<String> = described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let wrapped = positional_select(sql, columns.len());
        let objects = sqlx::query_scalar::<_, Value>(&wrapped)
            .bind(i64::from(max_rows))
            .fetch_all(&mut *tx)
            .await
            .map_err(map_query_error)?;

        // Nothing was written; ending the transaction either way is equivalent
        tx.rollback().await.map_err(map_db_error)?;

        let rows = objects
            .iter()
            .map(|object| {
                (0..columns.len())
                    .map(|i| object.get(positional_name(i)).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect::<Vec<Vec<Value>>>();

        debug!(columns = columns.len(), rows = rows.len(), "Read-only query finished");
        Ok(QueryOutput { columns, rows })
    }

    #[instrument(skip(self))]
    async fn describe_tables(&self, table: Option<&str>) -> RepoResult<Vec<TableSchema>> {
        let rows = sqlx::query_as::<_, ColumnRow>(
            r"
            SELECT table_name::text AS table_name,
                   column_name::text AS column_name,
                   data_type::text AS data_type,
                   is_nullable::text AS is_nullable
            FROM information_schema.columns
            WHERE table_schema = 'public'
              AND table_name NOT LIKE '\_sqlx%'
              AND ($1::text IS NULL OR table_name = $1)
            ORDER BY table_name, ordinal_position
            ",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut tables: BTreeMap<String, Vec<ColumnSchema>> = BTreeMap::new();
        for row in rows {
            tables.entry(row.table_name).or_default().push(ColumnSchema {
                name: row.column_name,
                data_type: row.data_type,
                nullable: row.is_nullable == "YES",
            });
        }

        if let Some(name) = table {
            if tables.is_empty() {
                return Err(DomainError::TableNotFound(name.to_string()));
            }
        }

        Ok(tables
            .into_iter()
            .map(|(name, columns)| TableSchema { name, columns })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgQueryRepository>();
    }

    #[test]
    fn test_positional_select_renames_every_column() {
        assert_eq!(
            positional_select("select 1 as id, 2 as id", 2),
            "SELECT to_jsonb(q) FROM (select 1 as id, 2 as id) AS q(c0, c1) LIMIT $1"
        );
        assert_eq!(
            positional_select("select", 0),
            "SELECT to_jsonb(q) FROM (select) AS q LIMIT $1"
        );
    }

    #[test]
    fn test_non_database_error_is_not_invalid_query() {
        let e = map_query_error(sqlx::Error::RowNotFound);
        assert!(matches!(e, DomainError::DatabaseError(_)));
    }
}
