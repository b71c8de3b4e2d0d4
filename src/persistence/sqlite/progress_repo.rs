//! SQLite-backed repository for learner progress records.

use sqlx::SqlitePool;

use super::helpers::{decode_status, encode_status};
use crate::persistence::traits::ProgressRepository;
use crate::persistence::{PersistenceError, ProgressKey, ProgressRecord, ProgressStatus};

/// Row type for progress queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct ProgressRow {
    user_id: i64,
    lesson_id: i64,
    status: String,
    completed_at: Option<i64>,
    last_accessed_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(r: ProgressRow) -> Self {
        Self {
            key: ProgressKey {
                user_id: r.user_id,
                lesson_id: r.lesson_id,
            },
            status: decode_status(&r.status),
            completed_at: r.completed_at,
            last_accessed_at: r.last_accessed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// SQLite implementation of [`ProgressRepository`].
pub struct SqliteProgressRepository {
    pool: SqlitePool,
}

impl SqliteProgressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProgressRepository for SqliteProgressRepository {
    async fn find_progress(
        &self,
        key: ProgressKey,
    ) -> Result<Option<ProgressRecord>, PersistenceError> {
        let row: Option<ProgressRow> = sqlx::query_as(
            r#"
            SELECT user_id, lesson_id, status, completed_at, last_accessed_at,
                   created_at, updated_at
            FROM lesson_progress
            WHERE user_id = ? AND lesson_id = ?
            "#,
        )
        .bind(key.user_id)
        .bind(key.lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ProgressRecord::from))
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO lesson_progress
                (user_id, lesson_id, status, completed_at, last_accessed_at,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                status = excluded.status,
                completed_at = excluded.completed_at,
                last_accessed_at = excluded.last_accessed_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.key.user_id)
        .bind(record.key.lesson_id)
        .bind(encode_status(record.status))
        .bind(record.completed_at)
        .bind(record.last_accessed_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_status(
        &self,
        key: ProgressKey,
        status: ProgressStatus,
        now: i64,
    ) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            "UPDATE lesson_progress SET status = ?, updated_at = ? WHERE user_id = ? AND lesson_id = ?",
        )
        .bind(encode_status(status))
        .bind(now)
        .bind(key.user_id)
        .bind(key.lesson_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn progress_by_course(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<ProgressRecord>, PersistenceError> {
        let rows: Vec<ProgressRow> = sqlx::query_as(
            r#"
            SELECT lp.user_id, lp.lesson_id, lp.status, lp.completed_at,
                   lp.last_accessed_at, lp.created_at, lp.updated_at
            FROM lesson_progress lp
            JOIN lessons l ON l.lesson_id = lp.lesson_id
            WHERE lp.user_id = ? AND l.course_id = ?
            ORDER BY l.order_index ASC
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProgressRecord::from).collect())
    }

    async fn course_totals(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<(u32, u32), PersistenceError> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN lp.status = 'COMPLETED' THEN 1 ELSE 0 END), 0)
            FROM lesson_progress lp
            JOIN lessons l ON l.lesson_id = lp.lesson_id
            WHERE lp.user_id = ? AND l.course_id = ?
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((total as u32, completed as u32))
    }
}
