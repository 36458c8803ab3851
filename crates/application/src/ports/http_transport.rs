//! HTTP transport port

use std::future::Future;
use std::time::Duration;

use bastion_domain::{ApiResponse, HttpMethod};
use url::Url;

/// A fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: Url,
    /// Headers, including `Authorization` when a token is attached.
    pub headers: Vec<(String, String)>,
    /// Serialized body, if any.
    pub body: Option<Vec<u8>>,
    /// Timeout for this request.
    pub timeout: Duration,
}

impl TransportRequest {
    /// Returns a header value, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Failures where no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve host '{host}': {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The transport could not be built or used.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for dispatching HTTP requests.
///
/// Implementations must not interpret status codes: any received response,
/// including 4xx and 5xx, is returned as `Ok`.
pub trait HttpTransport: Send + Sync + 'static {
    /// Executes a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    fn execute(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}
