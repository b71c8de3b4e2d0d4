//! Error taxonomy surfaced by the service layer.

use crate::persistence::PersistenceError;

/// Typed failures reported to callers. Nothing here is retried
/// internally; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The operation conflicts with current state (publish flags,
    /// duplicate names, existing references).
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A caller-supplied value is out of range or missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Storage failure that is not a state conflict.
    #[error(transparent)]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for ServiceError {
    fn from(err: PersistenceError) -> Self {
        match err {
            // Integrity violations are state conflicts from the caller's
            // point of view, not infrastructure failures.
            PersistenceError::Conflict(msg) => ServiceError::InvalidState(msg),
            other => ServiceError::Persistence(other),
        }
    }
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ServiceError::InvalidState(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ServiceError::InvalidArgument(_))
    }
}
