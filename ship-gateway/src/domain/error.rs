//! Domain error types.
//!
//! These errors represent request validation failures in the domain layer.
//! They are distinct from API/IO errors.

/// Domain-level errors for request validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// One or more required request fields are absent or blank
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Search criteria could not be merged into a valid configuration
    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),

    /// Request body is not a JSON object
    #[error("request body must be a JSON object")]
    NotAnObject,
}
