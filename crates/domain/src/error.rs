//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A request path cannot be joined onto the base URL.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Login credentials failed basic validation.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A payload could not be decoded from the backend response.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
