//! Single-flight token refresh.
//!
//! At most one refresh exchange is in flight per client. The slot is checked
//! and claimed under a synchronous lock, with no suspension point between the
//! check and the claim, so concurrent 401s always converge on one exchange.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::ports::StorageError;

/// Why a refresh exchange did not produce a new access token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshFailure {
    /// No refresh token is stored.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint could not be reached.
    #[error("refresh endpoint unreachable: {0}")]
    Transport(String),

    /// The refresh endpoint answered with an error status.
    #[error("refresh rejected with status {status}: {message}")]
    Rejected {
        /// Response status code.
        status: u16,
        /// Message from the backend, or the reason phrase.
        message: String,
    },

    /// The refresh response did not contain a token pair.
    #[error("malformed refresh response: {0}")]
    Malformed(String),

    /// The new tokens could not be persisted.
    #[error("failed to persist refreshed tokens: {0}")]
    Storage(String),
}

impl RefreshFailure {
    pub(crate) fn storage(error: StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Outcome shared by every waiter of one exchange.
pub(crate) type RefreshOutcome = Result<String, RefreshFailure>;

type Flight = OnceCell<RefreshOutcome>;

/// Single-slot register for the pending refresh exchange.
#[derive(Debug, Default)]
pub(crate) struct RefreshSlot {
    pending: Mutex<Option<Arc<Flight>>>,
}

impl RefreshSlot {
    /// Returns true while an exchange is in flight.
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Runs `exchange` unless one is already in flight, in which case the
    /// caller awaits that exchange's outcome instead.
    ///
    /// The slot is released before the outcome is handed back, whether the
    /// exchange succeeded or failed, so a later 401 starts a fresh exchange.
    pub(crate) async fn run<F, Fut>(&self, exchange: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome>,
    {
        let (flight, joined) = self.join_or_start();
        if joined {
            debug!("awaiting in-flight token refresh");
        }

        let owner = Arc::clone(&flight);
        flight
            .get_or_init(|| async move {
                let outcome = exchange().await;
                self.release(&owner);
                outcome
            })
            .await
            .clone()
    }

    fn join_or_start(&self) -> (Arc<Flight>, bool) {
        let mut pending = self.pending.lock();
        if let Some(flight) = pending.as_ref() {
            return (Arc::clone(flight), true);
        }
        let flight = Arc::new(Flight::new());
        *pending = Some(Arc::clone(&flight));
        (flight, false)
    }

    fn release(&self, flight: &Arc<Flight>) {
        let mut pending = self.pending.lock();
        if pending
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            *pending = None;
        }
    }
}
