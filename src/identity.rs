//! Verified identities and role-based authorization decisions.
//!
//! Token verification itself happens upstream; this module only consumes
//! the result. Roles are an explicit enum parsed from claim strings by
//! exact (case-insensitive) match — no substring sniffing.

use serde::{Deserialize, Serialize};

/// Role granted to a user by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// Parse a single realm-role claim. Unknown claims yield `None`
    /// rather than defaulting, so callers can ignore unrelated roles
    /// (identity providers mix infrastructure roles into the same set).
    pub fn from_claim(claim: &str) -> Option<Role> {
        match claim.to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "instructor" => Some(Role::Instructor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Role::Student => 0,
            Role::Instructor => 1,
            Role::Admin => 2,
        }
    }
}

/// Pick the most privileged role from a claim set, defaulting to
/// `Student` when none of the claims name a known role.
pub fn highest_role<'a, I>(claims: I) -> Role
where
    I: IntoIterator<Item = &'a str>,
{
    claims
        .into_iter()
        .filter_map(Role::from_claim)
        .max_by_key(|r| r.rank())
        .unwrap_or(Role::Student)
}

/// Identity of the current request, as produced by the upstream token
/// verifier. The email is the foreign key into the user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<Role>,
}

impl VerifiedIdentity {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// The single effective role for provisioning, most privileged wins.
    pub fn effective_role(&self) -> Role {
        self.roles
            .iter()
            .copied()
            .max_by_key(|r| r.rank())
            .unwrap_or(Role::Student)
    }

    /// Split the display name into (first, last). A missing or blank
    /// name becomes ("Unknown", "").
    pub fn name_parts(&self) -> (String, String) {
        let trimmed = self.display_name.trim();
        if trimmed.is_empty() {
            return ("Unknown".to_string(), String::new());
        }
        match trimmed.split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (trimmed.to_string(), String::new()),
        }
    }
}

/// Pure ownership decision: does `identity` act as the instructor who
/// owns a course? Requires the instructor role and a matching email.
pub fn owns_course(identity: &VerifiedIdentity, instructor_email: &str) -> bool {
    identity.has_role(Role::Instructor) && identity.email == instructor_email
}
