//! Well-known authentication endpoints of the admin backend.

/// Authentication endpoints consumed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    /// `POST` email/password login for admins.
    AdminLogin,
    /// `POST` refresh-token exchange.
    Refresh,
    /// `POST` server-side session invalidation.
    Logout,
    /// `GET` the current user.
    Me,
}

impl AuthEndpoint {
    /// Returns the endpoint path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AdminLogin => "/api/auth/admin/login",
            Self::Refresh => "/api/auth/refresh",
            Self::Logout => "/api/auth/logout",
            Self::Me => "/api/auth/me",
        }
    }

    /// Returns true if a 401 from `path` must not trigger a token refresh.
    ///
    /// Matching is by substring so absolute URLs and paths carrying a query
    /// string are recognized too.
    #[must_use]
    pub fn bypasses_refresh(path: &str) -> bool {
        path.contains("/auth/admin/login") || path.contains("/auth/refresh")
    }
}
