//! Shared encode/decode helpers for SQLite ↔ domain type conversions.
//!
//! These functions bridge the gap between domain enums and the TEXT
//! columns used in the SQLite schema's CHECK constraints.

use crate::identity::Role;
use crate::persistence::{Difficulty, ProgressStatus};

// ── ProgressStatus ─────────────────────────────────────────────────────

pub fn encode_status(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "NOT_STARTED",
        ProgressStatus::InProgress => "IN_PROGRESS",
        ProgressStatus::Completed => "COMPLETED",
    }
}

pub fn decode_status(s: &str) -> ProgressStatus {
    match s {
        "IN_PROGRESS" => ProgressStatus::InProgress,
        "COMPLETED" => ProgressStatus::Completed,
        _ => ProgressStatus::NotStarted,
    }
}

// ── Role ───────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str {
    match role {
        Role::Student => "STUDENT",
        Role::Instructor => "INSTRUCTOR",
        Role::Admin => "ADMIN",
    }
}

pub fn decode_role(s: &str) -> Role {
    match s {
        "INSTRUCTOR" => Role::Instructor,
        "ADMIN" => Role::Admin,
        _ => Role::Student,
    }
}

// ── Difficulty ─────────────────────────────────────────────────────────

pub fn encode_difficulty(d: Difficulty) -> &'static str {
    match d {
        Difficulty::Beginner => "BEGINNER",
        Difficulty::Intermediate => "INTERMEDIATE",
        Difficulty::Advanced => "ADVANCED",
        Difficulty::Expert => "EXPERT",
    }
}

pub fn decode_difficulty(s: &str) -> Difficulty {
    match s {
        "INTERMEDIATE" => Difficulty::Intermediate,
        "ADVANCED" => Difficulty::Advanced,
        "EXPERT" => Difficulty::Expert,
        _ => Difficulty::Beginner,
    }
}
