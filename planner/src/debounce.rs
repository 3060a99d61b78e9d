//! Single-slot deferred task
//!
//! Scheduling replaces whatever was pending, so a burst of calls inside the
//! quiet period runs the work once. Only the wait is cancellable: once the
//! delay has elapsed the work is spawned on its own task and runs to
//! completion even if a newer schedule arrives.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, aborting any timer armed before
    pub fn schedule<F>(&self, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(work);
        });

        if let Some(previous) = self.slot().replace(handle) {
            previous.abort();
        }
    }

    /// Abort the pending timer. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    /// A timer is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        // The slot holds no invariant a panic could break
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
