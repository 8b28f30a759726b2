//! Trailing-edge debouncing for UI-driven calls (search boxes and the like).

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

/// Runs `f` once `wait` has passed without another [`Debouncer::call`].
///
/// Each call replaces the pending one; only the latest argument is used.
pub struct Debouncer<A> {
    wait: Duration,
    f: Arc<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<AbortHandle>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new(wait: Duration, f: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self { wait, f: Arc::new(f), pending: Mutex::new(None) }
    }

    /// Schedule `f(arg)`, cancelling any call still waiting.
    ///
    /// Outside a tokio runtime nothing can be scheduled; the call is dropped
    /// with a warning and any pending call is left as is.
    pub fn call(&self, arg: A) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime; debounced call dropped");
            return;
        };
        let f = Arc::clone(&self.f);
        let wait = self.wait;
        let task = handle.spawn(async move {
            tokio::time::sleep(wait).await;
            f(arg);
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(pending) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

#[cfg(test)]
#[path = "debounce_test.rs"]
mod tests;
