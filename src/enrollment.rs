//! Enrollment and progress initialization.
//!
//! Enrolling a learner checks its preconditions (published course, every
//! lesson published, not already enrolled) under the course lock, then
//! inserts the enrollment relation and one `NotStarted` progress row per
//! lesson in a single transaction. A failure anywhere leaves neither the
//! relation nor any progress rows behind.
//!
//! Unenrolling removes only the relation; progress rows are the
//! learner's history and survive. On a later re-enrollment the bulk
//! initialization skips rows that already exist.

use crate::error::ServiceError;
use crate::locks::CourseLocks;
use crate::persistence::traits::{CourseRepository, LessonRepository, UserRepository};
use crate::persistence::CourseRecord;

pub struct EnrollmentManager<C, L, U> {
    courses: C,
    lessons: L,
    users: U,
    locks: CourseLocks,
}

impl<C, L, U> EnrollmentManager<C, L, U>
where
    C: CourseRepository,
    L: LessonRepository,
    U: UserRepository,
{
    pub fn new(courses: C, lessons: L, users: U, locks: CourseLocks) -> Self {
        Self {
            courses,
            lessons,
            users,
            locks,
        }
    }

    /// Enroll the learner identified by `student_email` into a course.
    pub async fn enroll(&self, student_email: &str, course_id: i64) -> Result<(), ServiceError> {
        let student = self
            .users
            .find_user_by_email(student_email)
            .await?
            .ok_or(ServiceError::NotFound("student"))?;

        // The lock keeps the lesson set stable between the precondition
        // read and the bulk insert.
        let _guard = self.locks.acquire(course_id).await;

        let course = self
            .courses
            .find_course(course_id)
            .await?
            .ok_or(ServiceError::NotFound("course"))?;
        if !course.is_published {
            return Err(ServiceError::InvalidState(
                "cannot enroll in an unpublished course".to_string(),
            ));
        }

        let lessons = self.lessons.lessons_by_course(course_id).await?;
        if let Some(unpublished) = lessons.iter().find(|l| !l.is_published) {
            tracing::warn!(
                course_id,
                lesson_id = unpublished.lesson_id,
                "enrollment rejected, course contains an unpublished lesson"
            );
            return Err(ServiceError::InvalidState(
                "cannot enroll while the course contains unpublished lessons".to_string(),
            ));
        }

        if self.courses.is_enrolled(student.user_id, course_id).await? {
            return Err(ServiceError::InvalidState(
                "student is already enrolled in this course".to_string(),
            ));
        }

        let lesson_ids: Vec<i64> = lessons.iter().map(|l| l.lesson_id).collect();
        self.courses
            .enroll_with_progress(student.user_id, course_id, &lesson_ids)
            .await?;

        tracing::info!(
            user_id = student.user_id,
            course_id,
            lessons = lesson_ids.len(),
            "enrolled student"
        );
        Ok(())
    }

    /// Remove the enrollment relation. Progress rows are kept.
    pub async fn unenroll(&self, student_email: &str, course_id: i64) -> Result<(), ServiceError> {
        let student = self
            .users
            .find_user_by_email(student_email)
            .await?
            .ok_or(ServiceError::NotFound("student"))?;
        self.courses
            .find_course(course_id)
            .await?
            .ok_or(ServiceError::NotFound("course"))?;

        self.courses.unenroll(student.user_id, course_id).await?;
        tracing::info!(user_id = student.user_id, course_id, "unenrolled student");
        Ok(())
    }

    /// Courses the learner is currently enrolled in.
    pub async fn enrolled_courses(
        &self,
        student_email: &str,
    ) -> Result<Vec<CourseRecord>, ServiceError> {
        let student = self
            .users
            .find_user_by_email(student_email)
            .await?
            .ok_or(ServiceError::NotFound("student"))?;
        Ok(self.courses.enrolled_courses(student.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::persistence::sqlite::{
        Database, SqliteCourseRepository, SqliteLessonRepository, SqliteUserRepository,
    };
    use crate::persistence::{CourseDraft, Difficulty, LessonDraft};

    type TestManager =
        EnrollmentManager<SqliteCourseRepository, SqliteLessonRepository, SqliteUserRepository>;

    struct Fixture {
        db: Database,
        manager: TestManager,
        course_id: i64,
        student_id: i64,
    }

    /// Seed an instructor, a student, and a published course with
    /// `lessons` published lessons.
    async fn fixture(lessons: u32) -> Fixture {
        let db = Database::new_in_memory().await.unwrap();
        let users = SqliteUserRepository::new(db.pool().clone());
        let courses = SqliteCourseRepository::new(db.pool().clone());
        let lesson_repo = SqliteLessonRepository::new(db.pool().clone());

        let instructor = users
            .create_user("subj-i", "ina@example.com", "Ina", "Smith", Role::Instructor)
            .await
            .unwrap();
        let student = users
            .create_user("subj-s", "stu@example.com", "Stu", "Dent", Role::Student)
            .await
            .unwrap();
        sqlx::query("INSERT INTO categories (name) VALUES ('General')")
            .execute(db.pool())
            .await
            .unwrap();

        let mut course = courses
            .create_course(
                instructor.user_id,
                &CourseDraft {
                    title: "Course".to_string(),
                    description: String::new(),
                    category_id: 1,
                    difficulty: Difficulty::Beginner,
                    duration_hours: 2,
                },
            )
            .await
            .unwrap();
        course.is_published = true;
        courses.save_course(&course).await.unwrap();

        for i in 1..=lessons {
            let mut lesson = lesson_repo
                .append_lesson(
                    course.course_id,
                    &LessonDraft {
                        title: format!("Lesson {i}"),
                        description: String::new(),
                        content: String::new(),
                        duration_minutes: 10,
                    },
                )
                .await
                .unwrap();
            lesson.is_published = true;
            lesson_repo.save_lesson(&lesson).await.unwrap();
        }

        let manager = EnrollmentManager::new(
            SqliteCourseRepository::new(db.pool().clone()),
            SqliteLessonRepository::new(db.pool().clone()),
            SqliteUserRepository::new(db.pool().clone()),
            CourseLocks::new(),
        );
        Fixture {
            db,
            manager,
            course_id: course.course_id,
            student_id: student.user_id,
        }
    }

    async fn progress_counts(db: &Database, user_id: i64) -> (i64, i64) {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lesson_progress WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        let not_started: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM lesson_progress WHERE user_id = ? AND status = 'NOT_STARTED'",
        )
        .bind(user_id)
        .fetch_one(db.pool())
        .await
        .unwrap();
        (total.0, not_started.0)
    }

    #[tokio::test]
    async fn test_enroll_creates_relation_and_not_started_rows() {
        let f = fixture(3).await;
        f.manager.enroll("stu@example.com", f.course_id).await.unwrap();

        let enrolled: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(enrolled.0, 1);
        assert_eq!(progress_counts(&f.db, f.student_id).await, (3, 3));
    }

    #[tokio::test]
    async fn test_enroll_rejected_when_a_lesson_is_unpublished() {
        let f = fixture(3).await;
        // Unpublish one lesson
        sqlx::query("UPDATE lessons SET is_published = 0 WHERE order_index = 2")
            .execute(f.db.pool())
            .await
            .unwrap();

        let err = f
            .manager
            .enroll("stu@example.com", f.course_id)
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());

        // Rejected as a whole: no relation, no progress rows
        let enrolled: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(enrolled.0, 0);
        assert_eq!(progress_counts(&f.db, f.student_id).await, (0, 0));
    }

    #[tokio::test]
    async fn test_enroll_rejected_for_unpublished_course() {
        let f = fixture(1).await;
        sqlx::query("UPDATE courses SET is_published = 0")
            .execute(f.db.pool())
            .await
            .unwrap();
        let err = f
            .manager
            .enroll("stu@example.com", f.course_id)
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[tokio::test]
    async fn test_double_enroll_is_invalid_state() {
        let f = fixture(1).await;
        f.manager.enroll("stu@example.com", f.course_id).await.unwrap();
        let err = f
            .manager
            .enroll("stu@example.com", f.course_id)
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[tokio::test]
    async fn test_unknown_student_or_course_is_not_found() {
        let f = fixture(1).await;
        assert!(f
            .manager
            .enroll("ghost@example.com", f.course_id)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(f
            .manager
            .enroll("stu@example.com", 999)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_unenroll_keeps_progress_and_allows_reenroll() {
        let f = fixture(2).await;
        f.manager.enroll("stu@example.com", f.course_id).await.unwrap();

        // Mark one lesson completed so we can tell rows apart
        sqlx::query(
            "UPDATE lesson_progress SET status = 'COMPLETED' WHERE user_id = ?
             AND lesson_id = (SELECT lesson_id FROM lessons WHERE order_index = 1)",
        )
        .bind(f.student_id)
        .execute(f.db.pool())
        .await
        .unwrap();

        f.manager.unenroll("stu@example.com", f.course_id).await.unwrap();
        assert_eq!(progress_counts(&f.db, f.student_id).await.0, 2);

        // Re-enroll: no duplicates, the completed row is not reset
        f.manager.enroll("stu@example.com", f.course_id).await.unwrap();
        let (total, not_started) = progress_counts(&f.db, f.student_id).await;
        assert_eq!(total, 2);
        assert_eq!(not_started, 1);
    }

    #[tokio::test]
    async fn test_enrolled_courses_roundtrip() {
        let f = fixture(1).await;
        assert!(f
            .manager
            .enrolled_courses("stu@example.com")
            .await
            .unwrap()
            .is_empty());
        f.manager.enroll("stu@example.com", f.course_id).await.unwrap();
        let list = f.manager.enrolled_courses("stu@example.com").await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].course_id, f.course_id);
    }
}
