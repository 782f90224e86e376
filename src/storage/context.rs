//! Request Context
//!
//! Cancellation and deadline carrier passed to every storage operation.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::CacheError;

// == Context ==
/// Carries cancellation and an optional deadline to storage backends.
///
/// Backends that perform real I/O should check [`Context::err`] or await
/// [`Context::cancelled`]. In-memory backends are free to ignore it.
/// Clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now. A timeout too large
    /// to represent (e.g. `Duration::MAX`) means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// A context cancelled together with `token`.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Reports why the context is done, if it is.
    pub fn err(&self) -> Option<CacheError> {
        if self.token.is_cancelled() {
            return Some(CacheError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CacheError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}
