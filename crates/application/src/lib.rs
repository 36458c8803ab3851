//! Bastion Application - Authenticated client and session services
//!
//! This crate defines the application layer with:
//! - Port traits for the HTTP transport and the session storage
//! - The authenticated API client with single-flight token refresh
//! - The authentication service holding the logged-in state
//! - Application-level error handling

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;
pub mod session;

pub use auth::{AuthService, AuthState};
pub use client::{ApiClient, ClientSettings, DEFAULT_TIMEOUT, RefreshFailure};
pub use error::{ApiError, ApiResult, AuthError, AuthResult};
pub use ports::{HttpTransport, SessionStorage, StorageError, TransportError, TransportRequest};
pub use session::{MemorySessionStorage, SessionStore};
