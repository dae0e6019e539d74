//! Errors raised by the pure stock domain.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A rule of the stock model was broken.
///
/// Remote and transport failures never appear here; the sync layer has its
/// own error type and wraps this one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller-supplied data is unusable: blank SKU, negative price and so on.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Stock arithmetic reached a state the ledger must never produce, such as
    /// a negative balance or a movement applied to the wrong product.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Uniqueness clash, e.g. a second product with the same SKU.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
