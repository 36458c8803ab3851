//! Login, logout and session bookkeeping on top of [`ApiClient`].

use std::sync::Arc;

use bastion_domain::{
    AdminRole, AuthEndpoint, HttpMethod, LoginCredentials, LoginResponse, Permissions,
    RequestOptions, Session, UserRecord,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::state::AuthState;
use crate::client::ApiClient;
use crate::error::{AuthError, AuthResult};
use crate::ports::{HttpTransport, StorageError};

const LOGIN_FAILED: &str = "Login failed";

/// Authentication service for the admin session.
///
/// Cloning is cheap; clones share the client and the state.
pub struct AuthService<T> {
    client: ApiClient<T>,
    state: Arc<RwLock<AuthState>>,
}

impl<T> Clone for AuthService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> std::fmt::Debug for AuthService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> AuthService<T> {
    /// Creates a logged-out service. Call [`AuthService::initialize`] to
    /// restore a persisted session.
    #[must_use]
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(AuthState::default())),
        }
    }

    /// Returns the API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Restores the state from storage.
    ///
    /// Returns `true` if a complete session was found. A corrupt stored user
    /// clears the storage and counts as no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or cleared.
    pub async fn initialize(&self) -> AuthResult<bool> {
        match self.client.session().load().await {
            Ok(Some(session)) => {
                info!(user = %session.user.email, "restored stored session");
                *self.state.write().await = AuthState::from_session(session);
                Ok(true)
            }
            Ok(None) => {
                debug!("no stored session");
                Ok(false)
            }
            Err(StorageError::Serialization(message)) => {
                warn!(error = %message, "failed to parse stored session, clearing it");
                self.clear().await?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Logs in with email and password and persists the session.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidInput` if the credentials are blank
    /// - `AuthError::LoginFailed` with the backend message, or "Login failed"
    /// - `AuthError::Storage` if the session cannot be persisted
    pub async fn login(&self, credentials: &LoginCredentials) -> AuthResult<UserRecord> {
        credentials.validate()?;
        info!(email = %credentials.email, "logging in");

        let response = match self
            .client
            .post::<LoginResponse, _>(AuthEndpoint::AdminLogin.path(), credentials)
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "login failed");
                self.discard().await;
                return Err(AuthError::LoginFailed {
                    message: error
                        .server_message()
                        .map_or_else(|| LOGIN_FAILED.to_string(), str::to_string),
                });
            }
        };

        let session = Session::from(response);
        self.client.session().save(&session).await?;
        let user = session.user.clone();
        *self.state.write().await = AuthState::from_session(session);

        info!(user = %user.email, role = %user.role, "logged in");
        Ok(user)
    }

    /// Invalidates the session on the backend, then clears it locally.
    ///
    /// The backend call is best effort; its failure is only logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the local storage cannot be cleared.
    pub async fn logout(&self) -> AuthResult<()> {
        if let Err(error) = self
            .client
            .send_raw::<()>(
                HttpMethod::Post,
                AuthEndpoint::Logout.path(),
                None,
                &RequestOptions::default(),
            )
            .await
        {
            warn!(error = %error, "logout request failed");
        }

        self.clear().await?;
        info!("logged out");
        Ok(())
    }

    /// Exchanges the refresh token for a new token pair.
    ///
    /// Shares any exchange already in flight on the client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the exchange failed. The session is
    /// cleared in that case.
    pub async fn refresh_session(&self) -> AuthResult<()> {
        match self.client.refresh().await {
            Ok(_) => {
                self.sync_tokens().await?;
                Ok(())
            }
            Err(error) => {
                self.reset_state().await;
                Err(error.into())
            }
        }
    }

    /// Fetches the current user and persists it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the request failed. The session is
    /// cleared in that case.
    pub async fn fetch_current_user(&self) -> AuthResult<UserRecord> {
        let user = match self.client.get::<UserRecord>(AuthEndpoint::Me.path()).await {
            Ok(user) => user,
            Err(error) => {
                warn!(error = %error, "failed to fetch current user");
                self.discard().await;
                return Err(error.into());
            }
        };

        self.client.session().save_user(&user).await?;
        self.sync_tokens().await?;
        {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
            state.is_authenticated = true;
        }
        Ok(user)
    }

    /// Returns true while a session is held.
    ///
    /// A session dropped from storage by the client (for example after a
    /// failed refresh) resets the state.
    pub async fn is_authenticated(&self) -> bool {
        if !self.state.read().await.is_logged_in() {
            return false;
        }

        match self.client.has_credentials().await {
            Ok(true) => true,
            Ok(false) => {
                debug!("stored session is gone, resetting state");
                self.reset_state().await;
                false
            }
            Err(error) => {
                warn!(error = %error, "failed to read session storage");
                false
            }
        }
    }

    /// Returns a snapshot of the state.
    ///
    /// Tokens are re-read from storage first, so a refresh the client ran
    /// on its own is reflected.
    pub async fn state(&self) -> AuthState {
        if self.is_authenticated().await
            && let Err(error) = self.sync_tokens().await
        {
            warn!(error = %error, "failed to re-read stored tokens");
        }
        self.state.read().await.clone()
    }

    /// Returns the logged-in user.
    pub async fn current_user(&self) -> Option<UserRecord> {
        self.state.read().await.user.clone()
    }

    /// Returns the logged-in user's role.
    pub async fn role(&self) -> Option<AdminRole> {
        self.state.read().await.user.as_ref().map(|u| u.role.clone())
    }

    /// Returns true if the logged-in user holds `permission`.
    pub async fn has_permission(&self, permission: &str) -> bool {
        self.with_permissions(|p| p.has_permission(permission)).await
    }

    /// Route guard check, see [`Permissions::can_access`].
    pub async fn can_access<P, R>(&self, required_permissions: &[P], required_roles: &[R]) -> bool
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        self.with_permissions(|p| p.can_access(required_permissions, required_roles))
            .await
    }

    /// Runs `f` against a [`Permissions`] view of the logged-in user.
    pub async fn with_permissions<F, O>(&self, f: F) -> O
    where
        F: FnOnce(Permissions<'_>) -> O,
    {
        let state = self.state.read().await;
        f(Permissions::new(state.user.as_ref()))
    }

    /// Clears the state and the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be cleared.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.reset_state().await;
        self.client.session().clear().await
    }

    async fn discard(&self) {
        if let Err(e) = self.clear().await {
            warn!(error = %e, "failed to clear session storage");
        }
    }

    async fn reset_state(&self) {
        *self.state.write().await = AuthState::default();
    }

    async fn sync_tokens(&self) -> Result<(), StorageError> {
        let session = self.client.session();
        let token = session.access_token().await?;
        let refresh_token = session.refresh_token().await?;

        let mut state = self.state.write().await;
        state.is_authenticated = token.is_some();
        state.token = token;
        state.refresh_token = refresh_token;
        Ok(())
    }
}
