//! Authorization decisions for course management.

use crate::error::ServiceError;
use crate::identity::{owns_course, VerifiedIdentity};
use crate::persistence::traits::{CourseRepository, UserRepository};

/// Answers "may this identity manage that course?" for callers guarding
/// the instructor-only operations (lesson structure, publishing,
/// deletion).
pub struct CourseAccessValidator<C, U> {
    courses: C,
    users: U,
}

impl<C, U> CourseAccessValidator<C, U>
where
    C: CourseRepository,
    U: UserRepository,
{
    pub fn new(courses: C, users: U) -> Self {
        Self { courses, users }
    }

    /// True iff the course exists and `identity` is its owning
    /// instructor. A missing course yields `false`, not an error; the
    /// operation behind the check will report NotFound itself.
    pub async fn is_course_instructor(
        &self,
        course_id: i64,
        identity: &VerifiedIdentity,
    ) -> Result<bool, ServiceError> {
        let Some(course) = self.courses.find_course(course_id).await? else {
            return Ok(false);
        };
        let Some(instructor) = self.users.find_user(course.instructor_id).await? else {
            return Ok(false);
        };
        Ok(owns_course(identity, &instructor.email))
    }
}
