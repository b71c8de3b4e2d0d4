//! Per-course locks serializing structural mutation.
//!
//! Reorder, delete and enrollment all follow a read-validate-write
//! sequence that spans more than one statement. SQLite gives us
//! atomicity per transaction but not serialization of the whole
//! sequence, so every such sequence holds the course's lock for its
//! duration.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily-populated map of one async mutex per course.
#[derive(Clone, Default)]
pub struct CourseLocks {
    locks: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl CourseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `course_id`, creating it on first use.
    /// The guard releases on drop.
    pub async fn acquire(&self, course_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(course_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
