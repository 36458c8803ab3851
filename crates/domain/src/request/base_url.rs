//! Base URL handling.
//!
//! Request paths are appended to the configured base URL verbatim, so a
//! base of `https://api.example.com/v1` and a path of `/api/admin/tenants`
//! resolve to `https://api.example.com/v1/api/admin/tenants`. Absolute
//! `http(s)://` paths bypass the base entirely.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Validated base URL of the admin backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Parses and validates a base URL. Only `http` and `https` are accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the string is not an absolute
    /// http(s) URL or carries a query string or fragment.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{}': {raw}",
                url.scheme()
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(DomainError::InvalidUrl(format!(
                "base URL must not carry a query or fragment: {raw}"
            )));
        }
        Ok(Self(url))
    }

    /// Returns the underlying URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Resolves a request path against this base.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` for empty paths or paths that do
    /// not form a valid URL once joined.
    pub fn resolve(&self, path: &str) -> DomainResult<Url> {
        let path = path.trim();
        if path.is_empty() {
            return Err(DomainError::InvalidPath("path is empty".to_string()));
        }

        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).map_err(|e| DomainError::InvalidPath(format!("{e}: {path}")));
        }

        let base = self.0.as_str().trim_end_matches('/');
        let joined = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| DomainError::InvalidPath(format!("{e}: {path}")))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl From<BaseUrl> for String {
    fn from(value: BaseUrl) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_appends_path_to_base() {
        let base = BaseUrl::parse("https://api.example.com").unwrap();
        let url = base.resolve("/api/admin/tenants").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/admin/tenants");
    }

    #[test]
    fn test_resolve_keeps_base_path_prefix() {
        let base = BaseUrl::parse("https://example.com/backend/").unwrap();
        let url = base.resolve("api/auth/me").unwrap();
        assert_eq!(url.as_str(), "https://example.com/backend/api/auth/me");
    }

    #[test]
    fn test_resolve_preserves_query_string() {
        let base = BaseUrl::parse("http://localhost:3000").unwrap();
        let url = base.resolve("/api/admin/tenants?page=2&limit=20").unwrap();
        assert_eq!(url.query(), Some("page=2&limit=20"));
    }

    #[test]
    fn test_resolve_absolute_url_bypasses_base() {
        let base = BaseUrl::parse("http://localhost:3000").unwrap();
        let url = base.resolve("https://other.example.com/health").unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/health");
    }

    #[test]
    fn test_resolve_rejects_empty_path() {
        let base = BaseUrl::parse("http://localhost:3000").unwrap();
        assert!(matches!(base.resolve("  "), Err(DomainError::InvalidPath(_))));
    }

    #[test]
    fn test_parse_rejects_non_http_scheme() {
        assert!(matches!(
            BaseUrl::parse("ftp://example.com"),
            Err(DomainError::InvalidUrl(_))
        ));
        assert!(BaseUrl::parse("not a url").is_err());
    }

    #[test]
    fn test_display_has_no_trailing_slash() {
        let base = BaseUrl::parse("https://api.example.com/").unwrap();
        assert_eq!(base.to_string(), "https://api.example.com");
    }
}
