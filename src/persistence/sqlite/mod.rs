//! SQLite-backed repository implementations.
//!
//! ## Database setup
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode** — allows one writer and multiple concurrent readers.
//! - **Foreign keys enabled** — enforced at the connection level; course
//!   deletion cascades to lessons, enrollments and progress rows.
//! - **Embedded migrations** — `sqlx::migrate!` runs
//!   `migrations/001_initial_schema.sql` automatically when
//!   [`Database::open`] is called. The schema is idempotent.
//!
//! ## Repository types
//!
//! Each `Sqlite*Repository` holds a `SqlitePool` and implements the
//! corresponding trait from [`crate::persistence::traits`]:
//!
//! | Type | Trait |
//! |------|-------|
//! | [`SqliteUserRepository`] | `UserRepository` |
//! | [`SqliteCategoryRepository`] | `CategoryRepository` |
//! | [`SqliteCourseRepository`] | `CourseRepository` |
//! | [`SqliteLessonRepository`] | `LessonRepository` |
//! | [`SqliteProgressRepository`] | `ProgressRepository` |
//!
//! Enum columns (role, difficulty, progress status) are stored as `TEXT`
//! and round-tripped through shared encode/decode helpers in [`helpers`].
//!
//! Multi-row mutations — order-index shifts, delete-and-reindex,
//! enrollment with bulk progress initialization — run inside a single
//! transaction each; see `lesson_repo` and `course_repo`.

mod database;
mod user_repo;
mod category_repo;
mod course_repo;
mod lesson_repo;
mod progress_repo;
pub(crate) mod helpers;

pub use database::Database;
pub use user_repo::SqliteUserRepository;
pub use category_repo::SqliteCategoryRepository;
pub use course_repo::SqliteCourseRepository;
pub use lesson_repo::SqliteLessonRepository;
pub use progress_repo::SqliteProgressRepository;
