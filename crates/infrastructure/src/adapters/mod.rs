//! Infrastructure adapters

mod reqwest_transport;

pub use reqwest_transport::{DEFAULT_USER_AGENT, MAX_REDIRECTS, ReqwestTransport};
