//! Configuration for the course-management store
//!
//! Handles data directory configuration with the following precedence:
//! 1. COURSE_MGMT_DATA_DIR environment variable
//! 2. ~/.config/course-management/data (production default)
//! 3. ./data (fallback for development)

use std::path::PathBuf;

const DEFAULT_CONFIG_DIR: &str = ".config/course-management/data";
const DEV_DATA_DIR: &str = "./data";
const DATABASE_FILE: &str = "courses.db";

/// Get the data directory for persistence.
///
/// Priority:
/// 1. COURSE_MGMT_DATA_DIR env variable if set
/// 2. $HOME/.config/course-management/data if HOME is set
/// 3. ./data as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COURSE_MGMT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Path of the SQLite database file inside the data directory.
pub fn get_database_path() -> PathBuf {
    get_data_dir().join(DATABASE_FILE)
}
