//! Authenticated HTTP client with single-flight token refresh.

mod api_client;
mod context;
mod refresh;

pub use api_client::{ApiClient, ClientSettings, DEFAULT_TIMEOUT};
pub use refresh::RefreshFailure;
