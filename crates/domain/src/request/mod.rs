//! Request-side types: HTTP method, base URL resolution, per-call options.

mod base_url;
mod method;
mod options;

pub use base_url::BaseUrl;
pub use method::HttpMethod;
pub use options::RequestOptions;
