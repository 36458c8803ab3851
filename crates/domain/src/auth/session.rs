//! Session and token types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserRecord;

/// Storage keys under which a session is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Current access token.
    AccessToken,
    /// Current refresh token.
    RefreshToken,
    /// JSON-serialized user record.
    User,
}

impl SessionKey {
    /// All keys, in the order they are written.
    pub const ALL: [Self; 3] = [Self::AccessToken, Self::RefreshToken, Self::User];

    /// Returns the storage key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "admin_token",
            Self::RefreshToken => "admin_refresh_token",
            Self::User => "admin_user",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access/refresh token pair returned by the refresh endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token exchanged for new access tokens.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// An authenticated admin session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Current access token.
    pub access_token: String,
    /// Current refresh token.
    pub refresh_token: String,
    /// The authenticated user.
    pub user: UserRecord,
}

impl Session {
    /// Creates a session from a token pair and user.
    #[must_use]
    pub fn new(tokens: TokenPair, user: UserRecord) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }

    /// Returns the token pair of this session.
    #[must_use]
    pub fn tokens(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .field("user", &self.user.email)
            .finish()
    }
}

/// Formats an `Authorization` header value for a bearer token.
#[must_use]
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Get a preview of a token (first 8 chars + ...), safe for logs.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_keys() {
        assert_eq!(SessionKey::AccessToken.as_str(), "admin_token");
        assert_eq!(SessionKey::RefreshToken.as_str(), "admin_refresh_token");
        assert_eq!(SessionKey::User.as_str(), "admin_user");
    }

    #[test]
    fn test_token_pair_wire_format() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"accessToken":"a-1","refreshToken":"r-1"}"#).unwrap();
        assert_eq!(pair, TokenPair::new("a-1", "r-1"));
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefgh...");
        assert_eq!(token_preview("short"), "***");
    }

    #[test]
    fn test_debug_does_not_leak_tokens() {
        let pair = TokenPair::new("eyJhbGciOiJIUzI1NiJ9.secret", "refresh-secret-value");
        let debug = format!("{pair:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(bearer_header("abc"), "Bearer abc");
    }
}
