//! MCP service
//!
//! Read-only SQL access for the assistant. Queries pass a keyword screen
//! here and then run in a read-only transaction with a statement timeout.

use migtrack_core::DomainError;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::dto::{McpQueryRequest, McpTool, McpToolsResponse, QueryResultResponse, SchemaResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Rows returned when the caller gives no limit
pub const DEFAULT_QUERY_LIMIT: u32 = 100;
/// Hard ceiling on rows per query, whatever the configuration says
pub const MAX_QUERY_LIMIT: u32 = 1000;

const BLOCKED_KEYWORDS: &[&str] = &[
    "drop", "delete", "update", "insert", "alter", "create", "truncate", "replace", "merge",
    "grant", "revoke", "execute", "exec",
];

/// Whether `query` is a single SELECT free of write or DDL keywords.
///
/// Comments are removed first, so keywords hidden in them do not count
/// and cannot be used to smuggle a second statement.
pub fn is_safe_sql_query(query: &str) -> bool {
    let normalized = strip_comments(query).to_lowercase();
    let normalized = normalized.trim();

    if !normalized.starts_with("select") {
        return false;
    }

    let single_statement = normalized.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if single_statement.contains(';') {
        return false;
    }

    !normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| BLOCKED_KEYWORDS.contains(&word))
}

/// Replace `--` line comments and `/* */` block comments with a space.
/// An unterminated block comment runs to the end of the input.
///
/// Quoted literals and identifiers are copied as they are, so `'--'` is
/// text and not a comment. A doubled quote inside a literal reads as two
/// adjacent literals, which copies it unchanged as well.
fn strip_comments(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut rest = query;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.find('\n').map_or("", |end| &after[end..]);
            out.push(' ');
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |end| &after[end + 2..]);
            out.push(' ');
        } else if let Some(quote) = rest.chars().next().filter(|c| matches!(c, '\'' | '"')) {
            // Unterminated quotes run to the end of the input
            let end = rest[1..].find(quote).map_or(rest.len(), |close| close + 2);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    out
}

/// Effective row cap for one query
fn effective_limit(requested: Option<u32>, configured_max: u32) -> u32 {
    let max = configured_max.clamp(1, MAX_QUERY_LIMIT);
    requested.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, max)
}

/// MCP service
pub struct McpService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> McpService<'a> {
    /// Create a new McpService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Static tool catalogue
    pub fn tools(&self) -> McpToolsResponse {
        McpToolsResponse {
            tools: vec![
                McpTool {
                    name: "db_query",
                    description: "Run a read-only SELECT query against the tracking database",
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "query": { "type": "string", "description": "A single SELECT statement" },
                            "limit": {
                                "type": "integer",
                                "minimum": 1,
                                "maximum": MAX_QUERY_LIMIT,
                                "default": DEFAULT_QUERY_LIMIT
                            }
                        },
                        "required": ["query"]
                    }),
                },
                McpTool {
                    name: "db_get_schema",
                    description: "List tables and their columns",
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "table_name": { "type": "string", "description": "Restrict to one table" }
                        }
                    }),
                },
            ],
        }
    }

    /// Column listing of public tables
    #[instrument(skip(self))]
    pub async fn schema(
        &self,
        user_id: i64,
        table_name: Option<&str>,
    ) -> ServiceResult<SchemaResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let tables = self.ctx.query_repo().describe_tables(table_name).await?;
        Ok(SchemaResponse { tables })
    }

    /// Run a screened SELECT
    #[instrument(skip(self, request))]
    pub async fn execute(
        &self,
        user_id: i64,
        request: McpQueryRequest,
    ) -> ServiceResult<QueryResultResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        if !is_safe_sql_query(&request.query) {
            warn!(user_id, "Rejected unsafe query");
            return Err(DomainError::UnsafeQuery(
                "only a single SELECT statement without write keywords is allowed".to_string(),
            )
            .into());
        }

        // The query is wrapped in a subselect, so a trailing line comment must not survive
        let sql = strip_comments(&request.query);
        let config = self.ctx.mcp_config();
        let limit = effective_limit(request.limit, config.max_rows);
        let output = self
            .ctx
            .query_repo()
            .run_read_only(&sql, limit, config.statement_timeout_ms)
            .await?;

        info!(user_id, limit, row_count = output.rows.len(), "Query executed");

        Ok(QueryResultResponse {
            row_count: output.rows.len(),
            columns: output.columns,
            rows: output.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_selects_are_safe() {
        assert!(is_safe_sql_query("SELECT * FROM applications"));
        assert!(is_safe_sql_query("  select count(*) from sub_tasks;  "));
        assert!(is_safe_sql_query("select updated_at, created_by from applications"));
    }

    #[test]
    fn test_non_select_is_rejected() {
        assert!(!is_safe_sql_query("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!is_safe_sql_query("explain select 1"));
        assert!(!is_safe_sql_query(""));
    }

    #[test]
    fn test_every_blocked_keyword_is_rejected() {
        for keyword in BLOCKED_KEYWORDS {
            let query = format!("select 1 from t where x = 1 {keyword} y");
            assert!(!is_safe_sql_query(&query), "{keyword}");
            assert!(!is_safe_sql_query(&query.to_uppercase()), "{keyword}");
        }
    }

    #[test]
    fn test_multiple_statements_are_rejected() {
        assert!(!is_safe_sql_query("select 1; select 2"));
        assert!(!is_safe_sql_query("select 1;drop table users"));
    }

    #[test]
    fn test_comments_are_stripped() {
        assert!(is_safe_sql_query("-- drop everything\nselect 1"));
        assert!(is_safe_sql_query("select /* delete */ 1"));
        assert!(!is_safe_sql_query("/* select */ delete from users"));
        assert!(!is_safe_sql_query("select 1 /* harmless */; drop table users"));
    }

    #[test]
    fn test_comment_markers_inside_literals_are_kept() {
        assert!(is_safe_sql_query("select '--' as x"));
        assert_eq!(strip_comments("select '--' as x"), "select '--' as x");
        assert_eq!(strip_comments("select '/* x */' as y"), "select '/* x */' as y");
        assert_eq!(strip_comments(r#"select 1 as "a--b""#), r#"select 1 as "a--b""#);
        assert_eq!(strip_comments("select 'it''s' -- note"), "select 'it''s'  ");
        assert_eq!(strip_comments("select 'open -- x"), "select 'open -- x");
    }

    #[test]
    fn test_comments_after_literals_are_still_stripped() {
        assert_eq!(strip_comments("select 'a' /* drop */, 'b'"), "select 'a'  , 'b'");
        assert!(!is_safe_sql_query("select '--'; drop table users"));
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 1000), DEFAULT_QUERY_LIMIT);
        assert_eq!(effective_limit(Some(5000), 1000), 1000);
        assert_eq!(effective_limit(Some(5000), 50_000), MAX_QUERY_LIMIT);
        assert_eq!(effective_limit(Some(500), 200), 200);
        assert_eq!(effective_limit(Some(0), 1000), 1);
    }
}
