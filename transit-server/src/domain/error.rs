//! Domain error types.
//!
//! These errors represent validation failures when constructing domain
//! values. They are distinct from store and provider errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Coordinate outside the valid latitude/longitude range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Unknown passenger class name
    #[error("unknown passenger class: {0}")]
    InvalidPassengerClass(String),

    /// Identifier of zero or otherwise unusable
    #[error(transparent)]
    InvalidId(#[from] super::InvalidId),
}
