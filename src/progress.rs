//! Learner progress tracking and per-course aggregation.

use crate::error::ServiceError;
use crate::persistence::traits::{LessonRepository, ProgressRepository, UserRepository};
use crate::persistence::{
    now_timestamp, LessonRecord, ProgressKey, ProgressRecord, ProgressStatus,
};

/// Partial progress update; `None` fields are left unchanged (or unset,
/// when the update creates the record).
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdate {
    pub status: Option<ProgressStatus>,
    pub completed_at: Option<i64>,
    pub last_accessed_at: Option<i64>,
}

/// Per-course completion aggregate for one learner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub total: u32,
    pub completed: u32,
    /// `completed * 100 / total`, rounded to two decimals; 0 when the
    /// learner has no progress rows for the course.
    pub percentage: f64,
}

pub struct ProgressTracker<P, L, U> {
    progress: P,
    lessons: L,
    users: U,
}

impl<P, L, U> ProgressTracker<P, L, U>
where
    P: ProgressRepository,
    L: LessonRepository,
    U: UserRepository,
{
    pub fn new(progress: P, lessons: L, users: U) -> Self {
        Self {
            progress,
            lessons,
            users,
        }
    }

    /// Create or update the learner's progress on a lesson. Only the
    /// supplied fields overwrite existing state; a record is created on
    /// first touch (this is how lessons added after enrollment become
    /// trackable).
    pub async fn update_progress(
        &self,
        student_email: &str,
        lesson_id: i64,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, ServiceError> {
        let student = self.require_student(student_email).await?;
        let lesson = self.require_published_lesson(lesson_id).await?;

        let key = ProgressKey {
            user_id: student,
            lesson_id: lesson.lesson_id,
        };
        let now = now_timestamp();

        let mut record = match self.progress.find_progress(key).await? {
            Some(existing) => existing,
            None => ProgressRecord {
                key,
                status: ProgressStatus::NotStarted,
                completed_at: None,
                last_accessed_at: None,
                created_at: now,
                updated_at: now,
            },
        };

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(completed_at) = update.completed_at {
            record.completed_at = Some(completed_at);
        }
        if let Some(last_accessed_at) = update.last_accessed_at {
            record.last_accessed_at = Some(last_accessed_at);
        }
        record.updated_at = now;

        self.progress.upsert_progress(&record).await?;
        Ok(record)
    }

    /// Update only the status of an existing record. Unlike
    /// [`update_progress`](Self::update_progress) this never creates one.
    pub async fn set_status(
        &self,
        student_email: &str,
        lesson_id: i64,
        status: ProgressStatus,
    ) -> Result<ProgressRecord, ServiceError> {
        let student = self.require_student(student_email).await?;
        let lesson = self.require_published_lesson(lesson_id).await?;

        let key = ProgressKey {
            user_id: student,
            lesson_id: lesson.lesson_id,
        };
        let updated = self
            .progress
            .update_status(key, status, now_timestamp())
            .await?;
        if !updated {
            return Err(ServiceError::NotFound("lesson progress"));
        }
        self.progress
            .find_progress(key)
            .await?
            .ok_or(ServiceError::NotFound("lesson progress"))
    }

    /// All of the learner's progress records for one course, in lesson
    /// order.
    pub async fn progress_by_course(
        &self,
        student_email: &str,
        course_id: i64,
    ) -> Result<Vec<ProgressRecord>, ServiceError> {
        let student = self.require_student(student_email).await?;
        Ok(self.progress.progress_by_course(student, course_id).await?)
    }

    /// Completion aggregate over the learner's progress rows for one
    /// course. A learner with no rows gets an all-zero summary.
    pub async fn course_summary(
        &self,
        student_email: &str,
        course_id: i64,
    ) -> Result<ProgressSummary, ServiceError> {
        let student = self.require_student(student_email).await?;
        let (total, completed) = self.progress.course_totals(student, course_id).await?;

        let percentage = if total > 0 {
            let raw = f64::from(completed) * 100.0 / f64::from(total);
            (raw * 100.0).round() / 100.0
        } else {
            0.0
        };

        Ok(ProgressSummary {
            total,
            completed,
            percentage,
        })
    }

    async fn require_student(&self, email: &str) -> Result<i64, ServiceError> {
        Ok(self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound("student"))?
            .user_id)
    }

    async fn require_published_lesson(
        &self,
        lesson_id: i64,
    ) -> Result<LessonRecord, ServiceError> {
        let lesson = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?;
        if !lesson.is_published {
            return Err(ServiceError::InvalidState(
                "cannot update progress in an unpublished lesson".to_string(),
            ));
        }
        Ok(lesson)
    }
}
