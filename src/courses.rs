//! Course catalog operations.

use crate::error::ServiceError;
use crate::persistence::traits::{CategoryRepository, CourseRepository, UserRepository};
use crate::persistence::{CourseDraft, CourseRecord, CourseSearch, CourseUpdate};

pub struct CourseManager<C, Cat, U> {
    courses: C,
    categories: Cat,
    users: U,
}

impl<C, Cat, U> CourseManager<C, Cat, U>
where
    C: CourseRepository,
    Cat: CategoryRepository,
    U: UserRepository,
{
    pub fn new(courses: C, categories: Cat, users: U) -> Self {
        Self {
            courses,
            categories,
            users,
        }
    }

    /// Create a course owned by the instructor identified by email.
    /// New courses start unpublished.
    pub async fn create_course(
        &self,
        instructor_email: &str,
        draft: CourseDraft,
    ) -> Result<CourseRecord, ServiceError> {
        if draft.title.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "course title must not be empty".to_string(),
            ));
        }
        let instructor = self
            .users
            .find_user_by_email(instructor_email)
            .await?
            .ok_or(ServiceError::NotFound("instructor"))?;
        self.categories
            .find_category(draft.category_id)
            .await?
            .ok_or(ServiceError::NotFound("category"))?;

        let course = self.courses.create_course(instructor.user_id, &draft).await?;
        tracing::info!(course_id = course.course_id, "created course");
        Ok(course)
    }

    /// Partially update a course's descriptive fields.
    pub async fn update_course(
        &self,
        course_id: i64,
        update: CourseUpdate,
    ) -> Result<CourseRecord, ServiceError> {
        let mut course = self.require_course(course_id).await?;

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(ServiceError::InvalidArgument(
                    "course title must not be empty".to_string(),
                ));
            }
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(category_id) = update.category_id {
            self.categories
                .find_category(category_id)
                .await?
                .ok_or(ServiceError::NotFound("category"))?;
            course.category_id = category_id;
        }
        if let Some(difficulty) = update.difficulty {
            course.difficulty = difficulty;
        }
        if let Some(duration_hours) = update.duration_hours {
            course.duration_hours = duration_hours;
        }

        self.courses.save_course(&course).await?;
        Ok(course)
    }

    /// Mark a course as published, making it open for enrollment.
    pub async fn publish_course(&self, course_id: i64) -> Result<CourseRecord, ServiceError> {
        let mut course = self.require_course(course_id).await?;
        if !course.is_published {
            course.is_published = true;
            self.courses.save_course(&course).await?;
            tracing::info!(course_id, "published course");
        }
        Ok(course)
    }

    /// Delete a course together with its lessons, enrollments and
    /// progress rows (foreign-key cascade).
    pub async fn delete_course(&self, course_id: i64) -> Result<(), ServiceError> {
        self.require_course(course_id).await?;
        self.courses.delete_course(course_id).await?;
        tracing::info!(course_id, "deleted course");
        Ok(())
    }

    pub async fn get_course(&self, course_id: i64) -> Result<CourseRecord, ServiceError> {
        self.require_course(course_id).await
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseRecord>, ServiceError> {
        Ok(self.courses.list_courses().await?)
    }

    pub async fn courses_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CourseRecord>, ServiceError> {
        self.categories
            .find_category(category_id)
            .await?
            .ok_or(ServiceError::NotFound("category"))?;
        Ok(self.courses.courses_by_category(category_id).await?)
    }

    pub async fn courses_by_instructor(
        &self,
        instructor_email: &str,
    ) -> Result<Vec<CourseRecord>, ServiceError> {
        let instructor = self
            .users
            .find_user_by_email(instructor_email)
            .await?
            .ok_or(ServiceError::NotFound("instructor"))?;
        Ok(self.courses.courses_by_instructor(instructor.user_id).await?)
    }

    /// Case-insensitive substring search over title, category name and
    /// instructor name.
    pub async fn search_courses(
        &self,
        filter: CourseSearch,
    ) -> Result<Vec<CourseRecord>, ServiceError> {
        Ok(self.courses.search_courses(&filter).await?)
    }

    async fn require_course(&self, course_id: i64) -> Result<CourseRecord, ServiceError> {
        self.courses
            .find_course(course_id)
            .await?
            .ok_or(ServiceError::NotFound("course"))
    }
}
