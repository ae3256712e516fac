//! Tokio-backed timer host.
//!
//! Each scheduled callback is a spawned task that sleeps for the delay and then
//! runs the callback. Cancelling aborts the task. A task that has already
//! woken up may still run its callback after `cancel` returns, so callers that
//! care must guard against stale firings themselves (the debounce hook does,
//! with a generation counter).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use super::{TimerCallback, TimerError, TimerHandle, TimerHost};

/// Timer host running on a tokio runtime.
pub struct TokioTimers {
    /// Runtime the timer tasks are spawned on, if there is one.
    runtime: Option<Handle>,

    /// Abort handles of tasks that have not fired yet.
    tasks: Arc<DashMap<TimerHandle, AbortHandle>>,
}

impl TokioTimers {
    /// Create a host bound to the current tokio runtime.
    ///
    /// Outside a runtime the host is still constructed, but every schedule
    /// fails with [`TimerError::Unavailable`].
    pub fn new() -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            tracing::warn!("no tokio runtime in scope; timers will be unavailable");
        }
        Self {
            runtime,
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Create a host bound to an explicit runtime handle.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            runtime: Some(handle),
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for TokioTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost for TokioTimers {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> Result<TimerHandle, TimerError> {
        let runtime = self.runtime.as_ref().ok_or(TimerError::Unavailable)?;
        let handle = TimerHandle::next();
        let tasks = Arc::clone(&self.tasks);

        let deadline = tokio::time::Instant::now() + delay;
        let (armed_tx, armed_rx) = oneshot::channel::<()>();

        let task = runtime.spawn(async move {
            // The entry must be in the table before this task can remove it.
            if armed_rx.await.is_err() {
                return;
            }
            tokio::time::sleep_until(deadline).await;
            tasks.remove(&handle);
            callback();
        });

        self.tasks.insert(handle, task.abort_handle());
        let _ = armed_tx.send(());

        tracing::debug!(timer = handle.id(), ?delay, "tokio timer scheduled");
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some((_, task)) = self.tasks.remove(&handle) {
            task.abort();
            tracing::debug!(timer = handle.id(), "tokio timer cancelled");
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
        self.tasks.clear();
    }
}

impl std::fmt::Debug for TokioTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTimers")
            .field("available", &self.runtime.is_some())
            .field("pending", &self.tasks.len())
            .finish()
    }
}
