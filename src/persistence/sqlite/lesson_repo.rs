//! SQLite-backed repository for lessons.
//!
//! The order-index mutations (`append_lesson`, `apply_reorder`,
//! `delete_and_close_gap`) each run as one transaction so a failure can
//! never leave a course's index sequence with gaps or duplicates.

use sqlx::SqlitePool;

use crate::persistence::traits::LessonRepository;
use crate::persistence::{LessonDraft, LessonRecord, PersistenceError};

/// Row type for lesson queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct LessonRow {
    lesson_id: i64,
    course_id: i64,
    title: String,
    description: String,
    content: String,
    order_index: i64,
    duration_minutes: i64,
    is_published: i64,
}

impl From<LessonRow> for LessonRecord {
    fn from(r: LessonRow) -> Self {
        Self {
            lesson_id: r.lesson_id,
            course_id: r.course_id,
            title: r.title,
            description: r.description,
            content: r.content,
            order_index: r.order_index as u32,
            duration_minutes: r.duration_minutes as u32,
            is_published: r.is_published != 0,
        }
    }
}

const SELECT_LESSON: &str = r#"
    SELECT lesson_id, course_id, title, description, content,
           order_index, duration_minutes, is_published
    FROM lessons
"#;

/// SQLite implementation of [`LessonRepository`].
pub struct SqliteLessonRepository {
    pool: SqlitePool,
}

impl SqliteLessonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LessonRepository for SqliteLessonRepository {
    async fn append_lesson(
        &self,
        course_id: i64,
        draft: &LessonDraft,
    ) -> Result<LessonRecord, PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let (max_index,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(order_index), 0) FROM lessons WHERE course_id = ?")
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?;

        let order_index = max_index + 1;
        let result = sqlx::query(
            r#"
            INSERT INTO lessons
                (course_id, title, description, content, order_index,
                 duration_minutes, is_published)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(course_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.content)
        .bind(order_index)
        .bind(draft.duration_minutes as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LessonRecord {
            lesson_id: result.last_insert_rowid(),
            course_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            order_index: order_index as u32,
            duration_minutes: draft.duration_minutes,
            is_published: false,
        })
    }

    async fn find_lesson(&self, lesson_id: i64) -> Result<Option<LessonRecord>, PersistenceError> {
        let row: Option<LessonRow> =
            sqlx::query_as(&format!("{SELECT_LESSON} WHERE lesson_id = ?"))
                .bind(lesson_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(LessonRecord::from))
    }

    async fn save_lesson(&self, lesson: &LessonRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            UPDATE lessons
            SET title = ?, description = ?, content = ?, duration_minutes = ?,
                is_published = ?
            WHERE lesson_id = ?
            "#,
        )
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(lesson.duration_minutes as i64)
        .bind(lesson.is_published as i64)
        .bind(lesson.lesson_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn lessons_by_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<LessonRecord>, PersistenceError> {
        let rows: Vec<LessonRow> = sqlx::query_as(&format!(
            "{SELECT_LESSON} WHERE course_id = ? ORDER BY order_index ASC"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LessonRecord::from).collect())
    }

    async fn count_lessons(&self, course_id: i64) -> Result<u32, PersistenceError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lessons WHERE course_id = ?")
                .bind(course_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }

    async fn apply_reorder(
        &self,
        course_id: i64,
        lesson_id: i64,
        current: u32,
        target: u32,
    ) -> Result<(), PersistenceError> {
        if current == target {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        if target > current {
            // Moving down: siblings in (current, target] step up one slot.
            sqlx::query(
                r#"
                UPDATE lessons SET order_index = order_index - 1
                WHERE course_id = ? AND order_index > ? AND order_index <= ?
                "#,
            )
            .bind(course_id)
            .bind(current as i64)
            .bind(target as i64)
            .execute(&mut *tx)
            .await?;
        } else {
            // Moving up: siblings in [target, current) step down one slot.
            sqlx::query(
                r#"
                UPDATE lessons SET order_index = order_index + 1
                WHERE course_id = ? AND order_index >= ? AND order_index < ?
                "#,
            )
            .bind(course_id)
            .bind(target as i64)
            .bind(current as i64)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE lessons SET order_index = ? WHERE lesson_id = ?")
            .bind(target as i64)
            .bind(lesson_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_and_close_gap(
        &self,
        course_id: i64,
        lesson_id: i64,
        order_index: u32,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM lessons WHERE lesson_id = ?")
            .bind(lesson_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE lessons SET order_index = order_index - 1 WHERE course_id = ? AND order_index > ?",
        )
        .bind(course_id)
        .bind(order_index as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
