//! Typed access to the persisted session.

use std::fmt;
use std::sync::Arc;

use bastion_domain::{Session, SessionKey, TokenPair, UserRecord};

use crate::ports::{SessionStorage, StorageError};

/// Typed view over a [`SessionStorage`].
///
/// The session lives under three keys (see [`SessionKey`]). Empty values are
/// treated as absent.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    async fn read(&self, key: SessionKey) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get(key.as_str())
            .await?
            .filter(|value| !value.is_empty()))
    }

    /// Returns the stored access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.read(SessionKey::AccessToken).await
    }

    /// Returns the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.read(SessionKey::RefreshToken).await
    }

    /// Returns the stored user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored record is not a
    /// valid user.
    pub async fn user(&self) -> Result<Option<UserRecord>, StorageError> {
        self.read(SessionKey::User)
            .await?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| {
                    StorageError::Serialization(format!("stored user is corrupt: {e}"))
                })
            })
            .transpose()
    }

    /// Loads the complete session; `None` unless all three keys are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or the user is corrupt.
    pub async fn load(&self) -> Result<Option<Session>, StorageError> {
        let (Some(access_token), Some(refresh_token)) =
            (self.access_token().await?, self.refresh_token().await?)
        else {
            return Ok(None);
        };

        Ok(self.user().await?.map(|user| Session {
            access_token,
            refresh_token,
            user,
        }))
    }

    /// Persists a complete session.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or storage fails.
    pub async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = Self::encode_user(&session.user)?;
        self.storage
            .set(&[
                (SessionKey::AccessToken.as_str(), session.access_token.clone()),
                (SessionKey::RefreshToken.as_str(), session.refresh_token.clone()),
                (SessionKey::User.as_str(), user),
            ])
            .await
    }

    /// Persists both tokens in one write.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.storage
            .set(&[
                (SessionKey::AccessToken.as_str(), tokens.access_token.clone()),
                (SessionKey::RefreshToken.as_str(), tokens.refresh_token.clone()),
            ])
            .await
    }

    /// Persists the user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or storage fails.
    pub async fn save_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let user = Self::encode_user(user)?;
        self.storage.set(&[(SessionKey::User.as_str(), user)]).await
    }

    /// Removes all session keys.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let keys = SessionKey::ALL.map(SessionKey::as_str);
        self.storage.remove(&keys).await
    }

    fn encode_user(user: &UserRecord) -> Result<String, StorageError> {
        serde_json::to_string(user).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
