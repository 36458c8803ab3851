//! Authentication domain types
//!
//! Session and token types persisted by the client, the admin user record,
//! login credentials, the well-known auth endpoints and permission checks.

mod credentials;
mod endpoints;
mod permissions;
mod session;
mod user;

pub use credentials::{LoginCredentials, LoginResponse};
pub use endpoints::AuthEndpoint;
pub use permissions::Permissions;
pub use session::{Session, SessionKey, TokenPair, bearer_header, token_preview};
pub use user::{AdminRole, UserRecord};
