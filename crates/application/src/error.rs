//! Application error types

use bastion_domain::{ApiResponse, DomainError, PayloadError, StatusCode, response::error_message};
use thiserror::Error;

use crate::ports::{StorageError, TransportError};

/// Errors surfaced by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401 and the session could not be recovered.
    #[error("unauthenticated: {message}")]
    Unauthenticated {
        /// Message from the backend, or the reason phrase.
        message: String,
    },

    /// No response was received. Never retried.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered with a non-401 error status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Message from the backend, or the reason phrase.
        message: String,
        /// Original response body.
        body: Vec<u8>,
    },

    /// A 2xx envelope reported `success: false`.
    #[error("request rejected by backend: {message}")]
    Rejected {
        /// Message from the backend.
        message: String,
    },

    /// The response body did not match the expected payload.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Session storage failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Builds the error for a non-2xx response.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        let message = error_message(&response.body)
            .unwrap_or_else(|| response.status.reason_phrase().to_string());

        if response.status.is_unauthorized() {
            Self::Unauthenticated { message }
        } else {
            Self::Status {
                status: response.status,
                message,
                body: response.body.clone(),
            }
        }
    }

    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthenticated { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the message the backend supplied, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { message }
            | Self::Status { message, .. }
            | Self::Rejected { message } => Some(message),
            _ => None,
        }
    }

    /// Returns true if the caller should send the user to the login screen.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}

impl From<PayloadError> for ApiError {
    fn from(error: PayloadError) -> Self {
        match error {
            PayloadError::Rejected { message } => Self::Rejected { message },
            PayloadError::Malformed(message) => Self::Decode(message),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

/// Errors surfaced by [`crate::AuthService`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login was refused or could not be completed.
    #[error("{message}")]
    LoginFailed {
        /// Message from the backend, or "Login failed".
        message: String,
    },

    /// Credentials failed local validation.
    #[error(transparent)]
    InvalidInput(#[from] DomainError),

    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
