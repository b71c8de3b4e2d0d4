//! Course management backend: catalog, lesson ordering, enrollment and
//! learner progress tracking on an embedded SQLite store.
//!
//! The crate is layered in two halves:
//!
//! - [`persistence`] defines repository traits over the relational store
//!   plus the SQLite implementations behind them. All multi-row
//!   mutations (order-index shifts, enrollment with bulk progress
//!   initialization) are transactional there.
//! - The service managers ([`courses`], [`categories`], [`lessons`],
//!   [`enrollment`], [`progress`], [`users`], [`access`]) hold the
//!   domain rules: validation, state guards, per-course serialization of
//!   structural mutations via [`locks::CourseLocks`].
//!
//! Identity is handled in [`identity`]: verified token claims are mapped
//! to an exact-match [`identity::Role`] and provisioned into the user
//! table by [`users::UserDirectory`].

pub mod access;
pub mod categories;
pub mod config;
pub mod courses;
pub mod enrollment;
pub mod error;
pub mod identity;
pub mod lessons;
pub mod locks;
pub mod persistence;
pub mod progress;
pub mod users;

pub use access::CourseAccessValidator;
pub use categories::CategoryManager;
pub use courses::CourseManager;
pub use enrollment::EnrollmentManager;
pub use error::ServiceError;
pub use lessons::LessonManager;
pub use locks::CourseLocks;
pub use progress::{ProgressSummary, ProgressTracker, ProgressUpdate};
pub use users::UserDirectory;
