//! Lesson ordering engine.
//!
//! Lessons inside a course carry a dense 1-based `order_index`: for a
//! course with N lessons the indices are exactly {1..N}. Creation is
//! append-only (`MAX + 1`), reordering shifts the affected sibling range
//! before assigning the target slot, and deletion closes the gap it
//! leaves. Each multi-row mutation commits as one transaction, and all
//! structural mutations on a course are serialized through
//! [`CourseLocks`].

use crate::error::ServiceError;
use crate::locks::CourseLocks;
use crate::persistence::traits::{CourseRepository, LessonRepository};
use crate::persistence::{LessonDraft, LessonRecord, LessonUpdate};

/// Owns append/reorder/delete for a course's lesson sequence.
pub struct LessonManager<L, C> {
    lessons: L,
    courses: C,
    locks: CourseLocks,
}

impl<L, C> LessonManager<L, C>
where
    L: LessonRepository,
    C: CourseRepository,
{
    pub fn new(lessons: L, courses: C, locks: CourseLocks) -> Self {
        Self {
            lessons,
            courses,
            locks,
        }
    }

    /// Append a new lesson at the end of the course. New lessons start
    /// unpublished.
    pub async fn create_lesson(
        &self,
        course_id: i64,
        draft: LessonDraft,
    ) -> Result<LessonRecord, ServiceError> {
        if draft.title.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "lesson title must not be empty".to_string(),
            ));
        }
        self.courses
            .find_course(course_id)
            .await?
            .ok_or(ServiceError::NotFound("course"))?;

        let _guard = self.locks.acquire(course_id).await;
        let lesson = self.lessons.append_lesson(course_id, &draft).await?;
        tracing::info!(
            course_id,
            lesson_id = lesson.lesson_id,
            order_index = lesson.order_index,
            "created lesson"
        );
        Ok(lesson)
    }

    /// Partially update a lesson. A supplied `order_index` that differs
    /// from the current one reorders the lesson within its course.
    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        update: LessonUpdate,
    ) -> Result<LessonRecord, ServiceError> {
        let course_id = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?
            .course_id;

        let _guard = self.locks.acquire(course_id).await;
        // Re-read under the lock; a concurrent reorder may have moved it.
        let mut lesson = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?;

        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(ServiceError::InvalidArgument(
                    "lesson title must not be empty".to_string(),
                ));
            }
        }

        if let Some(target) = update.order_index {
            if target != lesson.order_index {
                self.reorder_locked(&lesson, target).await?;
                lesson.order_index = target;
            }
        }

        if let Some(title) = update.title {
            lesson.title = title;
        }
        if let Some(description) = update.description {
            lesson.description = description;
        }
        if let Some(content) = update.content {
            lesson.content = content;
        }
        if let Some(duration) = update.duration_minutes {
            lesson.duration_minutes = duration;
        }

        self.lessons.save_lesson(&lesson).await?;
        Ok(lesson)
    }

    /// Move a lesson to `target` (1-based). `target` must lie within
    /// `[1, N]` for a course with N lessons. Moving a lesson to its
    /// current index is a no-op.
    pub async fn reorder_lesson(
        &self,
        lesson_id: i64,
        target: u32,
    ) -> Result<LessonRecord, ServiceError> {
        let course_id = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?
            .course_id;

        let _guard = self.locks.acquire(course_id).await;
        let mut lesson = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?;

        if target != lesson.order_index {
            self.reorder_locked(&lesson, target).await?;
            lesson.order_index = target;
        }
        Ok(lesson)
    }

    /// Mark a lesson as published.
    pub async fn publish_lesson(&self, lesson_id: i64) -> Result<LessonRecord, ServiceError> {
        let mut lesson = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?;
        if !lesson.is_published {
            lesson.is_published = true;
            self.lessons.save_lesson(&lesson).await?;
            tracing::info!(lesson_id, "published lesson");
        }
        Ok(lesson)
    }

    /// Delete a lesson and decrement the index of every sibling that
    /// followed it, in one transaction.
    pub async fn delete_lesson(&self, lesson_id: i64) -> Result<(), ServiceError> {
        let course_id = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?
            .course_id;

        let _guard = self.locks.acquire(course_id).await;
        let lesson = self
            .lessons
            .find_lesson(lesson_id)
            .await?
            .ok_or(ServiceError::NotFound("lesson"))?;

        self.lessons
            .delete_and_close_gap(course_id, lesson_id, lesson.order_index)
            .await?;
        tracing::info!(course_id, lesson_id, "deleted lesson");
        Ok(())
    }

    /// Lessons of a course in ascending order-index order, recomputed
    /// from the store on every call.
    pub async fn lessons_by_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<LessonRecord>, ServiceError> {
        Ok(self.lessons.lessons_by_course(course_id).await?)
    }

    /// Validate the target slot and apply the shift. Caller holds the
    /// course lock and guarantees `target != lesson.order_index`.
    async fn reorder_locked(
        &self,
        lesson: &LessonRecord,
        target: u32,
    ) -> Result<(), ServiceError> {
        let count = self.lessons.count_lessons(lesson.course_id).await?;
        if target < 1 || target > count {
            return Err(ServiceError::InvalidArgument(format!(
                "order index {target} out of range [1, {count}]"
            )));
        }
        self.lessons
            .apply_reorder(lesson.course_id, lesson.lesson_id, lesson.order_index, target)
            .await?;
        tracing::info!(
            course_id = lesson.course_id,
            lesson_id = lesson.lesson_id,
            from = lesson.order_index,
            to = target,
            "reordered lesson"
        );
        Ok(())
    }
}
