//! Host Timer Facility
//!
//! Hooks that need to "do something later" (settle a debounced value, flip a
//! mounted flag) never talk to a clock directly. They go through a
//! [`TimerHost`], which offers exactly two operations:
//!
//! - `schedule(delay, callback)` returns a handle for a single-fire callback
//! - `cancel(handle)` which is a no-op for unknown, fired or cancelled handles
//!
//! # Implementations
//!
//! - [`ManualTimers`]: a virtual clock advanced explicitly. Deterministic, used
//!   by tests and anywhere the host drives time itself.
//! - [`TokioTimers`]: one spawned task per timer on a tokio runtime.
//! - [`UnavailableTimers`]: a host without timers (non-interactive contexts).
//!   Every schedule fails with [`TimerError::Unavailable`] and hooks degrade to
//!   pass-through behavior.

mod manual;
mod tokio_timers;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;

pub use manual::ManualTimers;
pub use tokio_timers::TokioTimers;

/// A single-fire callback handed to a timer host.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle for a scheduled callback.
///
/// Handles are allocated from a process-wide counter, so ordering them gives
/// scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier, mostly useful for logging.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Failure to schedule a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("no timer facility is available in this context")]
    Unavailable,
}

/// A facility that runs callbacks after a delay.
pub trait TimerHost: Send + Sync {
    /// Schedule `callback` to run once, `delay` from now.
    ///
    /// The callback never runs synchronously inside this call, even for a
    /// zero delay.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> Result<TimerHandle, TimerError>;

    /// Cancel a scheduled callback.
    fn cancel(&self, handle: TimerHandle);
}

/// Timer host for contexts that have no event loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTimers;

impl TimerHost for UnavailableTimers {
    fn schedule(&self, _delay: Duration, _callback: TimerCallback) -> Result<TimerHandle, TimerError> {
        Err(TimerError::Unavailable)
    }

    fn cancel(&self, _handle: TimerHandle) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_ordered_by_allocation() {
        let a = TimerHandle::next();
        let b = TimerHandle::next();
        assert!(a < b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn unavailable_host_refuses_to_schedule() {
        let host = UnavailableTimers;
        let result = host.schedule(Duration::from_millis(10), Box::new(|| {}));
        assert_eq!(result, Err(TimerError::Unavailable));

        // Cancelling anything is still fine
        host.cancel(TimerHandle::next());
    }
}
