//! Bastion Infrastructure - Adapters and configuration
//!
//! This crate provides concrete implementations of the application ports:
//! - `ReqwestTransport`: HTTP transport using reqwest
//! - `FileSessionStorage`: session persistence in a JSON file
//! - `ClientConfig`: layered configuration loading
//!
//! `connect` wires them into a ready-to-use client and auth service.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

use std::sync::Arc;

use bastion_application::{ApiClient, AuthService, SessionStorage, SessionStore};

pub use adapters::{DEFAULT_USER_AGENT, MAX_REDIRECTS, ReqwestTransport};
pub use config::{ClientConfig, ConfigError, ConfigOverrides};
pub use persistence::FileSessionStorage;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};

/// Errors raised while wiring the client from a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be built.
    #[error(transparent)]
    Transport(#[from] bastion_application::TransportError),

    /// The session storage is unavailable.
    #[error(transparent)]
    Storage(#[from] bastion_application::StorageError),
}

/// Builds the reqwest-backed client and auth service described by `config`.
///
/// The session is stored in `config.session_path`, or the default location.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the transport cannot be
/// built or no session location is available.
pub fn connect(config: &ClientConfig) -> Result<AuthService<ReqwestTransport>, ConnectError> {
    let settings = config.to_settings()?;
    let transport = ReqwestTransport::with_user_agent(&config.user_agent)?;
    let storage: Arc<dyn SessionStorage> = match &config.session_path {
        Some(path) => Arc::new(FileSessionStorage::new(path)),
        None => Arc::new(FileSessionStorage::at_default_location()?),
    };

    let client = ApiClient::new(transport, SessionStore::new(storage), settings);
    Ok(AuthService::new(client))
}
