//! Bastion Domain - Core admin API types
//!
//! This crate defines the domain model for the Bastion admin API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{
    AdminRole, AuthEndpoint, LoginCredentials, LoginResponse, Permissions, Session, SessionKey,
    TokenPair, UserRecord,
};
pub use error::{DomainError, DomainResult};
pub use request::{BaseUrl, HttpMethod, RequestOptions};
pub use response::{ApiEnvelope, ApiResponse, PayloadError, StatusCode};
