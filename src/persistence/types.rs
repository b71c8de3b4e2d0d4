//! Record and draft types shared between the repositories and the
//! service layer. All ids are SQLite rowids, all timestamps are unix
//! epoch seconds.

use serde::{Deserialize, Serialize};

use crate::identity::Role;

/// A provisioned user (learner or instructor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    /// Issuer-assigned subject id from the verified identity.
    pub subject_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub category_id: i64,
    pub name: String,
    pub description: String,
}

/// Course difficulty rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub instructor_id: i64,
    pub category_id: i64,
    pub difficulty: Difficulty,
    pub duration_hours: u32,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields required to create a course.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub difficulty: Difficulty,
    pub duration_hours: u32,
}

/// Partial course update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub duration_hours: Option<u32>,
}

/// Case-insensitive substring filters for course search. `None` filters
/// match everything.
#[derive(Debug, Clone, Default)]
pub struct CourseSearch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub instructor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub lesson_id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    /// 1-based position within the course. For a course with N lessons
    /// the indices are exactly {1..N}.
    pub order_index: u32,
    pub duration_minutes: u32,
    pub is_published: bool,
}

/// Fields required to create a lesson. The order index is assigned by
/// the ordering engine, never by the caller.
#[derive(Debug, Clone)]
pub struct LessonDraft {
    pub title: String,
    pub description: String,
    pub content: String,
    pub duration_minutes: u32,
}

/// Partial lesson update; `None` fields are left unchanged. A supplied
/// `order_index` that differs from the current one triggers a reorder.
#[derive(Debug, Clone, Default)]
pub struct LessonUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration_minutes: Option<u32>,
    pub order_index: Option<u32>,
}

/// Completion state of one learner on one lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Composite key for a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub user_id: i64,
    pub lesson_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub key: ProgressKey,
    pub status: ProgressStatus,
    pub completed_at: Option<i64>,
    pub last_accessed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}
