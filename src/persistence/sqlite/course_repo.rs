//! SQLite-backed repository for courses and the enrollment relation.

use sqlx::SqlitePool;

use super::helpers::{decode_difficulty, encode_difficulty, encode_status};
use crate::persistence::traits::CourseRepository;
use crate::persistence::{
    now_timestamp, CourseDraft, CourseRecord, CourseSearch, PersistenceError, ProgressStatus,
};

/// Row type for course queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct CourseRow {
    course_id: i64,
    title: String,
    description: String,
    instructor_id: i64,
    category_id: i64,
    difficulty: String,
    duration_hours: i64,
    is_published: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<CourseRow> for CourseRecord {
    fn from(r: CourseRow) -> Self {
        Self {
            course_id: r.course_id,
            title: r.title,
            description: r.description,
            instructor_id: r.instructor_id,
            category_id: r.category_id,
            difficulty: decode_difficulty(&r.difficulty),
            duration_hours: r.duration_hours as u32,
            is_published: r.is_published != 0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_COURSE: &str = r#"
    SELECT c.course_id, c.title, c.description, c.instructor_id, c.category_id,
           c.difficulty, c.duration_hours, c.is_published, c.created_at, c.updated_at
    FROM courses c
"#;

/// SQLite implementation of [`CourseRepository`].
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CourseRepository for SqliteCourseRepository {
    async fn create_course(
        &self,
        instructor_id: i64,
        draft: &CourseDraft,
    ) -> Result<CourseRecord, PersistenceError> {
        let now = now_timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO courses
                (title, description, instructor_id, category_id, difficulty,
                 duration_hours, is_published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(instructor_id)
        .bind(draft.category_id)
        .bind(encode_difficulty(draft.difficulty))
        .bind(draft.duration_hours as i64)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(CourseRecord {
            course_id: result.last_insert_rowid(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            instructor_id,
            category_id: draft.category_id,
            difficulty: draft.difficulty,
            duration_hours: draft.duration_hours,
            is_published: false,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_course(&self, course_id: i64) -> Result<Option<CourseRecord>, PersistenceError> {
        let row: Option<CourseRow> =
            sqlx::query_as(&format!("{SELECT_COURSE} WHERE c.course_id = ?"))
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(CourseRecord::from))
    }

    async fn save_course(&self, course: &CourseRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            UPDATE courses
            SET title = ?, description = ?, category_id = ?, difficulty = ?,
                duration_hours = ?, is_published = ?, updated_at = ?
            WHERE course_id = ?
            "#,
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.category_id)
        .bind(encode_difficulty(course.difficulty))
        .bind(course.duration_hours as i64)
        .bind(course.is_published as i64)
        .bind(now_timestamp())
        .bind(course.course_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_course(&self, course_id: i64) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM courses WHERE course_id = ?")
            .bind(course_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<CourseRecord>, PersistenceError> {
        let rows: Vec<CourseRow> =
            sqlx::query_as(&format!("{SELECT_COURSE} ORDER BY c.created_at DESC"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(CourseRecord::from).collect())
    }

    async fn courses_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CourseRecord>, PersistenceError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            "{SELECT_COURSE} WHERE c.category_id = ? ORDER BY c.created_at DESC"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CourseRecord::from).collect())
    }

    async fn courses_by_instructor(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<CourseRecord>, PersistenceError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            "{SELECT_COURSE} WHERE c.instructor_id = ? ORDER BY c.created_at DESC"
        ))
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CourseRecord::from).collect())
    }

    async fn search_courses(
        &self,
        filter: &CourseSearch,
    ) -> Result<Vec<CourseRecord>, PersistenceError> {
        // NULL filters match everything; instructor matches first or
        // last name.
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"
            {SELECT_COURSE}
            LEFT JOIN users u ON u.user_id = c.instructor_id
            LEFT JOIN categories cat ON cat.category_id = c.category_id
            WHERE (?1 IS NULL OR INSTR(LOWER(c.title), LOWER(?1)) > 0)
              AND (?2 IS NULL OR INSTR(LOWER(cat.name), LOWER(?2)) > 0)
              AND (?3 IS NULL
                   OR INSTR(LOWER(u.first_name), LOWER(?3)) > 0
                   OR INSTR(LOWER(u.last_name), LOWER(?3)) > 0)
            ORDER BY c.created_at DESC
            "#
        ))
        .bind(&filter.title)
        .bind(&filter.category)
        .bind(&filter.instructor)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CourseRecord::from).collect())
    }

    async fn enroll_with_progress(
        &self,
        user_id: i64,
        course_id: i64,
        lesson_ids: &[i64],
    ) -> Result<(), PersistenceError> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO enrollments (user_id, course_id, enrolled_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(course_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        // OR IGNORE keeps progress rows that survived a previous
        // enrollment instead of resetting or duplicating them.
        for lesson_id in lesson_ids {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO lesson_progress
                    (user_id, lesson_id, status, completed_at, last_accessed_at,
                     created_at, updated_at)
                VALUES (?, ?, ?, NULL, NULL, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(lesson_id)
            .bind(encode_status(ProgressStatus::NotStarted))
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn unenroll(&self, user_id: i64, course_id: i64) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM enrollments WHERE user_id = ? AND course_id = ?")
            .bind(user_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_enrolled(&self, user_id: i64, course_id: i64) -> Result<bool, PersistenceError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = ? AND course_id = ?)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 != 0)
    }

    async fn enrolled_courses(&self, user_id: i64) -> Result<Vec<CourseRecord>, PersistenceError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"
            {SELECT_COURSE}
            JOIN enrollments e ON e.course_id = c.course_id
            WHERE e.user_id = ?
            ORDER BY e.enrolled_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CourseRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::persistence::sqlite::{Database, SqliteUserRepository};
    use crate::persistence::traits::UserRepository;
    use crate::persistence::Difficulty;

    async fn test_db() -> (Database, SqliteCourseRepository) {
        let db = Database::new_in_memory().await.unwrap();
        let repo = SqliteCourseRepository::new(db.pool().clone());
        (db, repo)
    }

    async fn seed_instructor(db: &Database, email: &str, first: &str, last: &str) -> i64 {
        let users = SqliteUserRepository::new(db.pool().clone());
        users
            .create_user(&format!("subj-{email}"), email, first, last, Role::Instructor)
            .await
            .unwrap()
            .user_id
    }

    async fn seed_category(db: &Database, name: &str) -> i64 {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(db.pool())
            .await
            .unwrap();
        result.last_insert_rowid()
    }

    fn sample_draft(category_id: i64, title: &str) -> CourseDraft {
        CourseDraft {
            title: title.to_string(),
            description: "desc".to_string(),
            category_id,
            difficulty: Difficulty::Beginner,
            duration_hours: 8,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let (db, repo) = test_db().await;
        let instructor = seed_instructor(&db, "i@example.com", "Ina", "Smith").await;
        let category = seed_category(&db, "Rust").await;

        let course = repo
            .create_course(instructor, &sample_draft(category, "Intro"))
            .await
            .unwrap();
        assert!(!course.is_published);

        let found = repo.find_course(course.course_id).await.unwrap();
        assert_eq!(found, Some(course));
    }

    #[tokio::test]
    async fn test_filter_by_category_and_instructor() {
        let (db, repo) = test_db().await;
        let ina = seed_instructor(&db, "ina@example.com", "Ina", "Smith").await;
        let bob = seed_instructor(&db, "bob@example.com", "Bob", "Jones").await;
        let rust = seed_category(&db, "Rust").await;
        let math = seed_category(&db, "Math").await;

        repo.create_course(ina, &sample_draft(rust, "Rust 101")).await.unwrap();
        repo.create_course(ina, &sample_draft(math, "Calculus")).await.unwrap();
        repo.create_course(bob, &sample_draft(rust, "Rust 201")).await.unwrap();

        assert_eq!(repo.courses_by_category(rust).await.unwrap().len(), 2);
        assert_eq!(repo.courses_by_instructor(ina).await.unwrap().len(), 2);
        assert_eq!(repo.courses_by_instructor(bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_by_title_and_instructor_name() {
        let (db, repo) = test_db().await;
        let ina = seed_instructor(&db, "ina@example.com", "Ina", "Smith").await;
        let rust = seed_category(&db, "Rust").await;
        repo.create_course(ina, &sample_draft(rust, "Advanced Rust")).await.unwrap();
        repo.create_course(ina, &sample_draft(rust, "Basket Weaving")).await.unwrap();

        let by_title = repo
            .search_courses(&CourseSearch {
                title: Some("rust".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Advanced Rust");

        let by_instructor = repo
            .search_courses(&CourseSearch {
                instructor: Some("smi".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_instructor.len(), 2);

        let none = repo
            .search_courses(&CourseSearch {
                category: Some("cooking".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_enroll_creates_relation_and_progress() {
        let (db, repo) = test_db().await;
        let instructor = seed_instructor(&db, "i@example.com", "Ina", "Smith").await;
        let student = seed_instructor(&db, "s@example.com", "Stu", "Dent").await;
        let category = seed_category(&db, "Rust").await;
        let course = repo
            .create_course(instructor, &sample_draft(category, "Intro"))
            .await
            .unwrap();

        // Seed two lessons directly
        let mut lesson_ids = Vec::new();
        for i in 1..=2 {
            let r = sqlx::query(
                "INSERT INTO lessons (course_id, title, order_index) VALUES (?, ?, ?)",
            )
            .bind(course.course_id)
            .bind(format!("Lesson {i}"))
            .bind(i)
            .execute(db.pool())
            .await
            .unwrap();
            lesson_ids.push(r.last_insert_rowid());
        }

        repo.enroll_with_progress(student, course.course_id, &lesson_ids)
            .await
            .unwrap();

        assert!(repo.is_enrolled(student, course.course_id).await.unwrap());
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lesson_progress WHERE user_id = ?")
                .bind(student)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count.0, 2);
    }

    #[tokio::test]
    async fn test_double_enroll_is_conflict() {
        let (db, repo) = test_db().await;
        let instructor = seed_instructor(&db, "i@example.com", "Ina", "Smith").await;
        let student = seed_instructor(&db, "s@example.com", "Stu", "Dent").await;
        let category = seed_category(&db, "Rust").await;
        let course = repo
            .create_course(instructor, &sample_draft(category, "Intro"))
            .await
            .unwrap();

        repo.enroll_with_progress(student, course.course_id, &[]).await.unwrap();
        let err = repo
            .enroll_with_progress(student, course.course_id, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unenroll_keeps_progress_rows() {
        let (db, repo) = test_db().await;
        let instructor = seed_instructor(&db, "i@example.com", "Ina", "Smith").await;
        let student = seed_instructor(&db, "s@example.com", "Stu", "Dent").await;
        let category = seed_category(&db, "Rust").await;
        let course = repo
            .create_course(instructor, &sample_draft(category, "Intro"))
            .await
            .unwrap();
        let r = sqlx::query("INSERT INTO lessons (course_id, title, order_index) VALUES (?, 'L', 1)")
            .bind(course.course_id)
            .execute(db.pool())
            .await
            .unwrap();

        repo.enroll_with_progress(student, course.course_id, &[r.last_insert_rowid()])
            .await
            .unwrap();
        repo.unenroll(student, course.course_id).await.unwrap();

        assert!(!repo.is_enrolled(student, course.course_id).await.unwrap());
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lesson_progress WHERE user_id = ?")
                .bind(student)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_enrolled_courses_lists_only_enrollments() {
        let (db, repo) = test_db().await;
        let instructor = seed_instructor(&db, "i@example.com", "Ina", "Smith").await;
        let student = seed_instructor(&db, "s@example.com", "Stu", "Dent").await;
        let category = seed_category(&db, "Rust").await;
        let a = repo.create_course(instructor, &sample_draft(category, "A")).await.unwrap();
        let _b = repo.create_course(instructor, &sample_draft(category, "B")).await.unwrap();

        repo.enroll_with_progress(student, a.course_id, &[]).await.unwrap();
        let enrolled = repo.enrolled_courses(student).await.unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].title, "A");
    }

    #[tokio::test]
    async fn test_delete_course_cascades() {
        let (db, repo) = test_db().await;
        let instructor = seed_instructor(&db, "i@example.com", "Ina", "Smith").await;
        let student = seed_instructor(&db, "s@example.com", "Stu", "Dent").await;
        let category = seed_category(&db, "Rust").await;
        let course = repo
            .create_course(instructor, &sample_draft(category, "Intro"))
            .await
            .unwrap();
        let r = sqlx::query("INSERT INTO lessons (course_id, title, order_index) VALUES (?, 'L', 1)")
            .bind(course.course_id)
            .execute(db.pool())
            .await
            .unwrap();
        repo.enroll_with_progress(student, course.course_id, &[r.last_insert_rowid()])
            .await
            .unwrap();

        repo.delete_course(course.course_id).await.unwrap();

        let lessons: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lessons")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let progress: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lesson_progress")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let enrollments: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!((lessons.0, progress.0, enrollments.0), (0, 0, 0));
    }
}
