//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It performs exactly one
//! network exchange per call and hands every received response, whatever its
//! status, back to the client.

use std::time::{Duration, Instant};

use bastion_application::ports::{HttpTransport, TransportError, TransportRequest};
use bastion_domain::{ApiResponse, HttpMethod};
use reqwest::{Client, Method};
use tracing::trace;

/// Redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("Bastion/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Creates a transport sending `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn map_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error_chain(error);
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        TransportError::Other(error.to_string())
    }
}

/// Joins an error and its sources; reqwest keeps the OS-level cause there.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &TransportRequest) -> Result<ApiResponse, TransportError> {
        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, request.timeout))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        trace!(status, bytes = body.len(), "response body read");

        Ok(ApiResponse::new(status, headers, body).with_duration(start.elapsed()))
    }
}
