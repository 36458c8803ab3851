//! Authentication state for the admin session.
//!
//! [`AuthService`] owns the in-memory view of who is logged in and keeps it in
//! step with the persisted session: login, logout, explicit refresh, fetching
//! the current user and restoring state at startup.

mod service;
mod state;

pub use service::AuthService;
pub use state::AuthState;
