//! Domain error model.

use thiserror::Error;

/// Result type used across the engine crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures the caller can act on.
/// Generative-model failures never appear here: engines convert those to
/// fallback behavior before they reach a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested entity (quote, vendor, session, …) does not exist.
    #[error("not found")]
    NotFound,

    /// A status transition is not permitted from the current state.
    /// The entity is left unmodified.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// A conflict occurred (e.g. the record already exists).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The data store failed to serve a read or write.
    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
