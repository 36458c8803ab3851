//! Per-request retry bookkeeping.

use bastion_domain::auth::token_preview;

/// Tracks one logical request across its original dispatch and replay.
#[derive(Clone, Default)]
pub(crate) struct RequestContext {
    retried: bool,
    token: Option<String>,
}

impl RequestContext {
    /// Starts a context for a request sent with `token`.
    pub(crate) const fn new(token: Option<String>) -> Self {
        Self {
            retried: false,
            token,
        }
    }

    /// Returns true until the request has been replayed once.
    pub(crate) const fn can_retry(&self) -> bool {
        !self.retried
    }

    /// Records the replay and the token it will carry.
    pub(crate) fn mark_retried(&mut self, token: String) {
        self.retried = true;
        self.token = Some(token);
    }

    /// The access token the request is (or was last) sent with.
    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("retried", &self.retried)
            .field("token", &self.token.as_deref().map(token_preview))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_allowed_once() {
        let mut context = RequestContext::new(Some("old".to_string()));
        assert!(context.can_retry());
        assert_eq!(context.token(), Some("old"));

        context.mark_retried("new".to_string());
        assert!(!context.can_retry());
        assert_eq!(context.token(), Some("new"));
    }
}
