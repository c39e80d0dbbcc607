//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown at the boundary for bad input (non-positive
//!   amounts, unknown donor references, empty names).
//! - [`NotFound`] thrown when a queried record does not exist.
//! - [`InvariantViolation`] thrown when a match commit would break a ledger
//!   cap. Reaching it means the allocator has a defect.
//! - [`ConcurrencyConflict`] thrown when the ledger changed between planning
//!   and committing a match.
//! - [`Timeout`] and [`Database`] are storage failures.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvariantViolation`]: EngineError::InvariantViolation
//!  [`ConcurrencyConflict`]: EngineError::ConcurrencyConflict
//!  [`Timeout`]: EngineError::Timeout
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` when retrying the same idempotent operation may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyConflict(_) | Self::Timeout(_) | Self::Database(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvariantViolation(a), Self::InvariantViolation(b)) => a == b,
            (Self::ConcurrencyConflict(a), Self::ConcurrencyConflict(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(EngineError::ConcurrencyConflict("x".to_string()).is_transient());
        assert!(EngineError::Timeout("x".to_string()).is_transient());
        assert!(EngineError::Database(DbErr::Custom("io".to_string())).is_transient());
    }

    #[test]
    fn boundary_and_defect_errors_are_not_retryable() {
        assert!(!EngineError::Validation("x".to_string()).is_transient());
        assert!(!EngineError::NotFound("x".to_string()).is_transient());
        assert!(!EngineError::InvariantViolation("x".to_string()).is_transient());
    }
}
