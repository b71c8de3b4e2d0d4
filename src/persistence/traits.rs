//! Async repository trait definitions for the persistence layer.
//!
//! Each trait abstracts over one aggregate of the relational store so
//! the service managers stay generic over the backend (static dispatch).
//!
//! Methods return `impl Future + Send` rather than using `async fn` so
//! that the futures are guaranteed `Send` — required once a manager is
//! handed to `tokio::spawn`.

use super::{
    CategoryRecord, CourseDraft, CourseRecord, CourseSearch, LessonDraft, LessonRecord,
    PersistenceError, ProgressKey, ProgressRecord, ProgressStatus, UserRecord,
};
use crate::identity::Role;
use std::future::Future;

/// Repository for provisioned users.
pub trait UserRepository: Send + Sync {
    fn create_user(
        &self,
        subject_id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> impl Future<Output = Result<UserRecord, PersistenceError>> + Send;
    fn find_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<UserRecord>, PersistenceError>> + Send;
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, PersistenceError>> + Send;
    fn update_user_role(
        &self,
        user_id: i64,
        role: Role,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Repository for course categories.
pub trait CategoryRepository: Send + Sync {
    fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> impl Future<Output = Result<CategoryRecord, PersistenceError>> + Send;
    fn find_category(
        &self,
        category_id: i64,
    ) -> impl Future<Output = Result<Option<CategoryRecord>, PersistenceError>> + Send;
    fn find_category_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<CategoryRecord>, PersistenceError>> + Send;
    fn save_category(
        &self,
        category: &CategoryRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn list_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<CategoryRecord>, PersistenceError>> + Send;
    fn delete_category(
        &self,
        category_id: i64,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Repository for courses and the learner enrollment relation.
///
/// `enroll_with_progress` must insert the enrollment row and the bulk of
/// `NotStarted` progress rows in a single transaction; a failure leaves
/// neither behind. Progress rows that already exist for the learner are
/// kept untouched (re-enrollment after unenroll).
pub trait CourseRepository: Send + Sync {
    fn create_course(
        &self,
        instructor_id: i64,
        draft: &CourseDraft,
    ) -> impl Future<Output = Result<CourseRecord, PersistenceError>> + Send;
    fn find_course(
        &self,
        course_id: i64,
    ) -> impl Future<Output = Result<Option<CourseRecord>, PersistenceError>> + Send;
    fn save_course(
        &self,
        course: &CourseRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn delete_course(
        &self,
        course_id: i64,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn list_courses(
        &self,
    ) -> impl Future<Output = Result<Vec<CourseRecord>, PersistenceError>> + Send;
    fn courses_by_category(
        &self,
        category_id: i64,
    ) -> impl Future<Output = Result<Vec<CourseRecord>, PersistenceError>> + Send;
    fn courses_by_instructor(
        &self,
        instructor_id: i64,
    ) -> impl Future<Output = Result<Vec<CourseRecord>, PersistenceError>> + Send;
    fn search_courses(
        &self,
        filter: &CourseSearch,
    ) -> impl Future<Output = Result<Vec<CourseRecord>, PersistenceError>> + Send;

    fn enroll_with_progress(
        &self,
        user_id: i64,
        course_id: i64,
        lesson_ids: &[i64],
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn unenroll(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn is_enrolled(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> impl Future<Output = Result<bool, PersistenceError>> + Send;
    fn enrolled_courses(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<CourseRecord>, PersistenceError>> + Send;
}

/// Repository for lessons, including the atomic multi-row order-index
/// operations used by the ordering engine.
///
/// `append_lesson` assigns `MAX(order_index) + 1` inside a transaction.
/// `apply_reorder` and `delete_and_close_gap` each execute their range
/// shift together with the final assignment/removal as one transaction;
/// callers are responsible for validating indices and for serializing
/// structural mutations per course.
pub trait LessonRepository: Send + Sync {
    fn append_lesson(
        &self,
        course_id: i64,
        draft: &LessonDraft,
    ) -> impl Future<Output = Result<LessonRecord, PersistenceError>> + Send;
    fn find_lesson(
        &self,
        lesson_id: i64,
    ) -> impl Future<Output = Result<Option<LessonRecord>, PersistenceError>> + Send;
    /// Update the content fields of a lesson. The order index is never
    /// touched here; that is `apply_reorder`'s job.
    fn save_lesson(
        &self,
        lesson: &LessonRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn lessons_by_course(
        &self,
        course_id: i64,
    ) -> impl Future<Output = Result<Vec<LessonRecord>, PersistenceError>> + Send;
    fn count_lessons(
        &self,
        course_id: i64,
    ) -> impl Future<Output = Result<u32, PersistenceError>> + Send;
    fn apply_reorder(
        &self,
        course_id: i64,
        lesson_id: i64,
        current: u32,
        target: u32,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn delete_and_close_gap(
        &self,
        course_id: i64,
        lesson_id: i64,
        order_index: u32,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Repository for learner progress records, keyed by (user, lesson).
pub trait ProgressRepository: Send + Sync {
    fn find_progress(
        &self,
        key: ProgressKey,
    ) -> impl Future<Output = Result<Option<ProgressRecord>, PersistenceError>> + Send;
    fn upsert_progress(
        &self,
        record: &ProgressRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    /// Update only the status of an existing record. Returns `false`
    /// when no record exists for the key.
    fn update_status(
        &self,
        key: ProgressKey,
        status: ProgressStatus,
        now: i64,
    ) -> impl Future<Output = Result<bool, PersistenceError>> + Send;
    fn progress_by_course(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> impl Future<Output = Result<Vec<ProgressRecord>, PersistenceError>> + Send;
    /// `(total, completed)` counts for the learner over the course's
    /// progress rows, computed in one query.
    fn course_totals(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> impl Future<Output = Result<(u32, u32), PersistenceError>> + Send;
}
