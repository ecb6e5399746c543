//! Dashboard service
//!
//! Migration progress counts over the applications in scope.

use chrono::Utc;
use tracing::instrument;

use crate::dto::{DashboardQuery, DashboardStatsResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Dashboard service
pub struct DashboardService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DashboardService<'a> {
    /// Create a new DashboardService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Counts and completion rates, optionally narrowed by team and period
    #[instrument(skip(self, query))]
    pub async fn stats(
        &self,
        user_id: i64,
        query: DashboardQuery,
    ) -> ServiceResult<DashboardStatsResponse> {
        PermissionService::new(self.ctx).actor(user_id).await?;

        let filter = query.into_filter(Utc::now());
        let stats = self.ctx.application_repo().dashboard_stats(&filter).await?;

        Ok(DashboardStatsResponse {
            total_applications: stats.total_applications,
            active_applications: stats.active_applications,
            completed_applications: stats.completed_applications,
            blocked_applications: stats.blocked_applications,
            delayed_applications: stats.delayed_applications,
            ak_completed_applications: stats.ak_completed_applications,
            cloud_native_completed_applications: stats.cloud_native_completed_applications,
            both_completed_applications: stats.both_completed_applications,
            ak_target_applications: stats.ak_target_applications,
            cloud_native_target_applications: stats.cloud_native_target_applications,
            ak_completion_rate: percentage(stats.ak_target_completed, stats.ak_target_applications),
            cloud_native_completion_rate: percentage(
                stats.cloud_native_target_completed,
                stats.cloud_native_target_applications,
            ),
            average_progress: round2(stats.average_progress),
            last_updated: stats.last_updated,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` of `whole` in percent, two decimals. Zero when `whole` is zero.
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / whole as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(41.666), 41.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
