//! PostgreSQL implementation of AnnouncementRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use migtrack_core::audit::AuditTable;
use migtrack_core::entities::{Announcement, NewAnnouncement};
use migtrack_core::traits::{AnnouncementFilter, AnnouncementRepository, Patch, RepoResult};
use migtrack_core::value_objects::PageRequest;

use crate::models::AnnouncementModel;

use super::audit_trail::{delete_recorded, lock_snapshot, record_changes, record_created};
use super::error::{announcement_not_found, map_db_error, to_total};

const FILTER_CLAUSE: &str = r"
    WHERE ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL OR priority = $2)
      AND ($3::bool IS NULL OR is_pinned = $3)
";

/// PostgreSQL implementation of AnnouncementRepository
#[derive(Clone)]
pub struct PgAnnouncementRepository {
    pool: PgPool,
}

impl PgAnnouncementRepository {
    /// Create a new PgAnnouncementRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementRepository for PgAnnouncementRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Announcement>> {
        let result = sqlx::query_as::<_, AnnouncementModel>(
            r"
            SELECT * FROM announcements WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Announcement::from))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &AnnouncementFilter,
        page: PageRequest,
    ) -> RepoResult<(Vec<Announcement>, u64)> {
        let status = filter.status.map(|s| s.as_str());
        let priority = filter.priority.map(|p| p.as_str());

        let sql = format!(
            "SELECT * FROM announcements {FILTER_CLAUSE} ORDER BY is_pinned DESC, created_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let models = sqlx::query_as::<_, AnnouncementModel>(&sql)
            .bind(status)
            .bind(priority)
            .bind(filter.is_pinned)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM announcements {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(status)
            .bind(priority)
            .bind(filter.is_pinned)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((
            models.into_iter().map(Announcement::from).collect(),
            to_total(total),
        ))
    }

    #[instrument(skip(self))]
    async fn find_active(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        pinned_only: bool,
    ) -> RepoResult<Vec<Announcement>> {
        let models = sqlx::query_as::<_, AnnouncementModel>(
            r"
            SELECT * FROM announcements
            WHERE status = 'published'
              AND publish_date IS NOT NULL
              AND publish_date <= $1
              AND (expire_date IS NULL OR expire_date > $1)
              AND (NOT $2 OR is_pinned)
            ORDER BY is_pinned DESC, publish_date DESC, id DESC
            LIMIT $3
            ",
        )
        .bind(now)
        .bind(pinned_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(Announcement::from).collect())
    }

    #[instrument(skip(self, announcement), fields(title = %announcement.title))]
    async fn create(&self, announcement: &NewAnnouncement, actor: i64) -> RepoResult<Announcement> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let model = sqlx::query_as::<_, AnnouncementModel>(
            r"
            INSERT INTO announcements (
                title, content, priority, status, created_by_user_id, is_pinned,
                publish_date, expire_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.priority.as_str())
        .bind(announcement.status.as_str())
        .bind(announcement.created_by_user_id)
        .bind(announcement.is_pinned)
        .bind(announcement.publish_date)
        .bind(announcement.expire_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        record_created(&mut tx, AuditTable::Announcements, model.id, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(Announcement::from(model))
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: i64,
        patch: Patch<'_, Announcement>,
        actor: i64,
    ) -> RepoResult<Announcement> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let before = lock_snapshot(&mut tx, AuditTable::Announcements, id)
            .await?
            .ok_or_else(|| announcement_not_found(id))?;

        let current = sqlx::query_as::<_, AnnouncementModel>(
            r"
            SELECT * FROM announcements WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let mut announcement = Announcement::from(current);
        patch(&mut announcement)?;

        let model = sqlx::query_as::<_, AnnouncementModel>(
            r"
            UPDATE announcements
            SET title = $2, content = $3, priority = $4, status = $5, is_pinned = $6,
                publish_date = $7, expire_date = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(announcement.id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.priority.as_str())
        .bind(announcement.status.as_str())
        .bind(announcement.is_pinned)
        .bind(announcement.publish_date)
        .bind(announcement.expire_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        record_changes(&mut tx, AuditTable::Announcements, id, &before, actor).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(Announcement::from(model))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64, actor: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if !delete_recorded(&mut tx, AuditTable::Announcements, id, actor).await? {
            return Err(announcement_not_found(id));
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
        assert_send_sync::<PgAnnouncementRepository>();
    }
}
