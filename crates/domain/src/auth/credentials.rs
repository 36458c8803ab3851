//! Login credentials and the login response.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Session, TokenPair, UserRecord};
use crate::error::{DomainError, DomainResult};

/// Email/password credentials for the admin login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Login email.
    pub email: String,
    /// Plain-text password, only ever sent to the login endpoint.
    pub password: String,
}

impl LoginCredentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Performs the cheap local checks before contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCredentials` for an empty password or an
    /// email without an `@`.
    pub fn validate(&self) -> DomainResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::InvalidCredentials(
                "email address is invalid".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(DomainError::InvalidCredentials(
                "password is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The logged-in user.
    pub user: UserRecord,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self::new(response.tokens, response.user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::AdminRole;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate() {
        assert!(LoginCredentials::new("a@b.com", "x").validate().is_ok());
        assert!(LoginCredentials::new("not-an-email", "x").validate().is_err());
        assert!(LoginCredentials::new("a@b.com", "").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = LoginCredentials::new("a@b.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_login_response_into_session() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"accessToken":"acc","refreshToken":"ref","user":{"id":"1","email":"a@b.com","role":"super_admin"}}"#,
        )
        .unwrap();

        let session = Session::from(response);
        assert_eq!(session.access_token, "acc");
        assert_eq!(session.refresh_token, "ref");
        assert_eq!(session.user.role, AdminRole::SuperAdmin);
    }
}
