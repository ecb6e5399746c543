//! Audit service
//!
//! Browsing the audit trail and rolling back a recorded change.
//!
//! A rollback without `confirm: true` is rejected before anything is read.
//! Everything after that (lookup, conflict checks, the compensating write and
//! its ROLLBACK entry) happens in one repository transaction.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use migtrack_core::audit::{activity_breakdown, summarize_changes, AuditTable};
use migtrack_core::entities::AuditOperation;
use migtrack_core::traits::{AuditLogFilter, AuditWindow};
use migtrack_core::{Page, PageRequest, UserRole};
use tracing::{info, instrument, warn};

use crate::dto::{
    AffectedRecord, AuditLogListQuery, AuditLogResponse, AuditStatisticsQuery,
    AuditStatisticsResponse, ChangeSummaryResponse, FieldChangeCount, RecordHistoryResponse,
    RollbackRequest, RollbackResponse, UserActivityQuery, UserActivityResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Users listed in the statistics ranking
const TOP_USERS: i64 = 10;
/// Hourly activity looks back this far when no start date is given
const HOURLY_LOOKBACK_DAYS: i64 = 7;
const DEFAULT_ACTIVITY_LIMIT: u32 = 100;
const MAX_ACTIVITY_LIMIT: u32 = 500;

/// Audit service
pub struct AuditService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditService<'a> {
    /// Create a new AuditService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Filtered page of audit entries, newest first (manager+)
    #[instrument(skip(self, query))]
    pub async fn list_logs(
        &self,
        user_id: i64,
        query: AuditLogListQuery,
        page: PageRequest,
    ) -> ServiceResult<Page<AuditLogResponse>> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let filter = AuditLogFilter::from(query);
        let (logs, total) = self.ctx.audit_log_repo().list(&filter, page).await?;

        Ok(Page::new(logs, total, page).map(AuditLogResponse::from))
    }

    /// Get one audit entry (manager+)
    #[instrument(skip(self))]
    pub async fn get_log(&self, user_id: i64, log_id: i64) -> ServiceResult<AuditLogResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let log = self
            .ctx
            .audit_log_repo()
            .find_by_id(log_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("AuditLog", log_id.to_string()))?;

        Ok(AuditLogResponse::from(log))
    }

    /// Every entry of one record, oldest first (manager+)
    #[instrument(skip(self))]
    pub async fn record_history(
        &self,
        user_id: i64,
        table_name: &str,
        record_id: i64,
    ) -> ServiceResult<RecordHistoryResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let table = parse_table(table_name)?;
        let history = self
            .ctx
            .audit_log_repo()
            .history(table.table_name(), record_id)
            .await?;

        Ok(RecordHistoryResponse {
            table_name: table.table_name().to_string(),
            record_id,
            total_operations: history.len(),
            history: history.into_iter().map(AuditLogResponse::from).collect(),
        })
    }

    /// Counts per operation, table, user and hour of day (manager+)
    #[instrument(skip(self, query))]
    pub async fn statistics(
        &self,
        user_id: i64,
        query: AuditStatisticsQuery,
    ) -> ServiceResult<AuditStatisticsResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let window = date_window(query.start_date, query.end_date)?;
        let hourly = hourly_window(window, Utc::now());
        let stats = self
            .ctx
            .audit_log_repo()
            .statistics(window, hourly, TOP_USERS)
            .await?;

        Ok(AuditStatisticsResponse {
            total_logs: stats.total_logs,
            by_operation: stats.by_operation,
            by_table: stats.by_table,
            top_users: stats.top_users,
            activity_by_hour: stats.activity_by_hour,
            period_start: query.start_date,
            period_end: query.end_date,
        })
    }

    /// What one user changed in a date range (manager+)
    #[instrument(skip(self, query))]
    pub async fn user_activity(
        &self,
        user_id: i64,
        target_user_id: i64,
        query: UserActivityQuery,
    ) -> ServiceResult<UserActivityResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let target = self
            .ctx
            .user_repo()
            .find_by_id(target_user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", target_user_id.to_string()))?;

        let window = date_window(query.start_date, query.end_date)?;
        let limit = activity_limit(query.limit);
        let logs = self
            .ctx
            .audit_log_repo()
            .user_activity(target.id, window, i64::from(limit))
            .await?;
        let breakdown = activity_breakdown(&logs);

        Ok(UserActivityResponse {
            user_id: target.id,
            username: target.username,
            full_name: target.full_name,
            start_date: query.start_date,
            end_date: query.end_date,
            total_operations: logs.len(),
            operations_breakdown: breakdown.operations,
            tables_affected: breakdown.tables,
            recent_activity: logs.into_iter().map(AuditLogResponse::from).collect(),
        })
    }

    /// Change summary of one record (manager+)
    #[instrument(skip(self))]
    pub async fn record_summary(
        &self,
        user_id: i64,
        table_name: &str,
        record_id: i64,
    ) -> ServiceResult<ChangeSummaryResponse> {
        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let table = parse_table(table_name)?;
        let history = self
            .ctx
            .audit_log_repo()
            .history(table.table_name(), record_id)
            .await?;
        let summary = summarize_changes(&history);

        Ok(ChangeSummaryResponse {
            table_name: table.table_name().to_string(),
            record_id,
            total_operations: summary.total_operations,
            total_changes: summary.total_changes,
            created_at: summary.created_at,
            created_by: summary.created_by,
            last_modified_at: summary.last_modified_at,
            last_modified_by: summary.last_modified_by,
            operations_breakdown: summary.operations,
            field_changes: summary.field_changes,
            most_changed_fields: summary
                .most_changed_fields
                .into_iter()
                .map(|(field, count)| FieldChangeCount { field, count })
                .collect(),
        })
    }

    /// Undo the change recorded by `log_id` (manager+)
    #[instrument(skip(self, request))]
    pub async fn rollback(
        &self,
        user_id: i64,
        log_id: i64,
        request: RollbackRequest,
    ) -> ServiceResult<RollbackResponse> {
        if !request.confirm {
            warn!(log_id, "Rollback rejected: not confirmed");
            return Err(ServiceError::validation(
                "Rollback must be confirmed with \"confirm\": true",
            ));
        }

        PermissionService::new(self.ctx)
            .require_role(user_id, UserRole::Manager)
            .await?;

        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let outcome = self
            .ctx
            .audit_log_repo()
            .rollback(log_id, user_id, reason)
            .await?;

        info!(
            log_id,
            rollback_audit_id = outcome.rollback_log.id,
            "Rollback completed"
        );

        let message = rollback_message(
            outcome.log.operation,
            &outcome.log.table_name,
            outcome.log.record_id,
        );

        Ok(RollbackResponse {
            status: "success".to_string(),
            rollback_audit_id: outcome.rollback_log.id,
            affected_record: AffectedRecord {
                table: outcome.log.table_name,
                id: outcome.log.record_id,
                operation: outcome.log.operation,
            },
            restored_record: outcome.restored_record,
            message,
        })
    }
}

fn parse_table(table_name: &str) -> ServiceResult<AuditTable> {
    table_name
        .parse::<AuditTable>()
        .map_err(|_| ServiceError::validation(format!("Table is not audited: {table_name}")))
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Both dates are inclusive. The end date covers its whole day.
fn date_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ServiceResult<AuditWindow> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ServiceError::validation(
                "start_date must not be after end_date",
            ));
        }
    }

    let before = match end {
        Some(end) => Some(
            end.checked_add_days(Days::new(1))
                .map(start_of)
                .ok_or_else(|| ServiceError::validation("end_date is out of range"))?,
        ),
        None => None,
    };

    Ok(AuditWindow {
        since: start.map(start_of),
        before,
    })
}

fn hourly_window(window: AuditWindow, now: DateTime<Utc>) -> AuditWindow {
    match window.since {
        Some(_) => window,
        None => AuditWindow {
            since: Some(now - Duration::days(HOURLY_LOOKBACK_DAYS)),
            before: window.before,
        },
    }
}

fn activity_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}

fn rollback_message(operation: AuditOperation, table: &str, record_id: i64) -> String {
    match operation {
        AuditOperation::Update => format!("Restored previous values of {table} #{record_id}"),
        AuditOperation::Delete => format!("Restored deleted record {table} #{record_id}"),
        AuditOperation::Create => format!("Removed created record {table} #{record_id}"),
        AuditOperation::Rollback => format!("Rolled back {table} #{record_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        assert_eq!(parse_table("sub_tasks").unwrap(), AuditTable::SubTasks);

        let err = parse_table("users").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_date_window_includes_end_day() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

        let window = date_window(Some(start), Some(end)).unwrap();
        assert_eq!(window.since, Some(start_of(start)));
        assert_eq!(
            window.before,
            Some(start_of(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()))
        );

        let open = date_window(None, None).unwrap();
        assert_eq!(open.since, None);
        assert_eq!(open.before, None);

        let err = date_window(Some(end), Some(start)).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_hourly_window_defaults_to_last_week() {
        let now = Utc::now();
        let hourly = hourly_window(AuditWindow::default(), now);
        assert_eq!(hourly.since, Some(now - Duration::days(7)));

        let day = start_of(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let given = AuditWindow {
            since: Some(day),
            before: None,
        };
        assert_eq!(hourly_window(given, now).since, Some(day));
    }

    #[test]
    fn test_activity_limit() {
        assert_eq!(activity_limit(None), 100);
        assert_eq!(activity_limit(Some(0)), 1);
        assert_eq!(activity_limit(Some(20)), 20);
        assert_eq!(activity_limit(Some(10_000)), 500);
    }

    #[test]
    fn test_rollback_message() {
        assert_eq!(
            rollback_message(AuditOperation::Delete, "announcements", 4),
            "Restored deleted record announcements #4"
        );
    }
}
