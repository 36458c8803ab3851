//! In-memory authentication state.

use bastion_domain::auth::token_preview;
use bastion_domain::{Session, UserRecord};

/// Snapshot of the authentication state held by [`crate::AuthService`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// The logged-in user.
    pub user: Option<UserRecord>,
    /// Current access token.
    pub token: Option<String>,
    /// Current refresh token.
    pub refresh_token: Option<String>,
    /// Set once a login or restore succeeded.
    pub is_authenticated: bool,
}

impl AuthState {
    /// Builds the authenticated state for a session.
    #[must_use]
    pub fn from_session(session: Session) -> Self {
        Self {
            user: Some(session.user),
            token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
            is_authenticated: true,
        }
    }

    /// True when the flag is set and an access token is held.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.is_authenticated && self.token.is_some()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("user", &self.user.as_ref().map(|u| u.email.as_str()))
            .field("token", &self.token.as_deref().map(token_preview))
            .field("refresh_token", &self.refresh_token.as_deref().map(token_preview))
            .field("is_authenticated", &self.is_authenticated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_domain::{AdminRole, TokenPair};

    #[test]
    fn test_default_is_logged_out() {
        assert!(!AuthState::default().is_logged_in());
    }

    #[test]
    fn test_flag_without_token_is_logged_out() {
        let state = AuthState {
            is_authenticated: true,
            ..AuthState::default()
        };
        assert!(!state.is_logged_in());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let state = AuthState::from_session(Session::new(
            TokenPair::new("eyJhbGciOiJIUzI1NiJ9.payload", "refresh-secret-value"),
            UserRecord::new("u-1", "ops@example.com", AdminRole::SupportAdmin),
        ));
        let rendered = format!("{state:?}");
        assert!(state.is_logged_in());
        assert!(rendered.contains("ops@example.com"));
        assert!(!rendered.contains("payload"));
        assert!(!rendered.contains("refresh-secret-value"));
    }
}
