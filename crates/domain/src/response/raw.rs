//! Undecoded HTTP response as returned by the transport.

use std::time::Duration;

use super::StatusCode;

/// HTTP response received from the backend, before envelope decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Time between dispatch and the end of the body.
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: impl Into<StatusCode>, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status: status.into(),
            headers,
            body,
            duration: Duration::ZERO,
        }
    }

    /// Sets the measured duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Returns a header value, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup() {
        let response = ApiResponse::new(
            200,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            b"{}".to_vec(),
        );
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
        assert_eq!(response.text(), "{}");
    }
}
