mod types;

pub mod sqlite;
pub mod traits;

pub use types::{
    CategoryRecord, CourseDraft, CourseRecord, CourseSearch, CourseUpdate, Difficulty,
    LessonDraft, LessonRecord, LessonUpdate, ProgressKey, ProgressRecord, ProgressStatus,
    UserRecord,
};

use std::time::{SystemTime, UNIX_EPOCH};

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        // Unique-key violations are surfaced as conflicts so the service
        // layer can report them as invalid state rather than a raw
        // storage failure.
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return PersistenceError::Conflict(db.message().to_string());
            }
        }
        PersistenceError::Sqlx(err)
    }
}

/// Get the current unix timestamp in seconds.
pub fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
