//! Trailing-edge debounce.
//!
//! [`Debounced`] holds a settled value and republishes a newly observed value
//! only after a quiet period with no further observations.
//!
//! # State Machine
//!
//! ```text
//! SETTLED(v)            --observe(v2, d)--> PENDING(v, v2, t)   t due at now + d
//! PENDING(v, v2, t)     --observe(v3, d)--> PENDING(v, v3, t')  t cancelled
//! PENDING(v, v2, t)     --t fires-------->  SETTLED(v2)
//! SETTLED | PENDING     --teardown------->  TORN_DOWN           t cancelled
//! ```
//!
//! Every observation restarts the window, including one that repeats the
//! value already pending. Nothing is compared, so `T` needs no `PartialEq`.
//!
//! The initial value is published immediately at construction.
//!
//! # Timers
//!
//! The pending timer is owned by the instance and never shared. Its callback
//! holds only a weak reference, so a dropped instance is not kept alive by a
//! timer that raced its cancellation, and every callback carries the
//! generation it was scheduled for so a stale firing cannot settle anything.
//!
//! When the timer host cannot schedule (no event loop), the instance logs a
//! warning and keeps publishing its current settled value.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::reactive::Signal;
use crate::timer::{TimerHandle, TimerHost};

enum Phase<T> {
    Settled,
    Pending { value: T, timer: TimerHandle, generation: u64 },
    TornDown,
}

struct Slot<T> {
    phase: Phase<T>,
    /// Generation of the most recently scheduled timer.
    generation: u64,
}

struct Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    settled: Signal<T>,
    slot: Mutex<Slot<T>>,
    timers: Arc<dyn TimerHost>,
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fire(&self, generation: u64) {
        let value = {
            let mut slot = self.slot.lock();
            match std::mem::replace(&mut slot.phase, Phase::Settled) {
                Phase::Pending { value, generation: pending, .. } if pending == generation => value,
                other => {
                    slot.phase = other;
                    tracing::trace!(generation, "ignoring stale debounce timer");
                    return;
                }
            }
        };

        tracing::debug!(signal = self.settled.id(), generation, "debounced value settled");
        // Published outside the lock: effects reading the signal may observe again.
        self.settled.set(value);
    }

    fn teardown(&self) {
        let previous = std::mem::replace(&mut self.slot.lock().phase, Phase::TornDown);
        match previous {
            Phase::Pending { timer, .. } => {
                self.timers.cancel(timer);
                tracing::debug!(signal = self.settled.id(), timer = timer.id(), "debounce torn down with pending timer");
            }
            Phase::Settled => {
                tracing::debug!(signal = self.settled.id(), "debounce torn down");
            }
            Phase::TornDown => {}
        }
    }
}

/// A value that follows its input only after the input goes quiet.
///
/// ```rust,ignore
/// let timers = Arc::new(ManualTimers::new());
/// let query = Debounced::new(String::new(), timers.clone());
///
/// query.observe("a".into(), Duration::from_millis(500));
/// query.observe("ab".into(), Duration::from_millis(500));
/// timers.advance(Duration::from_millis(500));
/// assert_eq!(query.value(), "ab");
/// ```
pub struct Debounced<T>
where
    T: Clone + Send + Sync + 'static,
{
    shared: Arc<Shared<T>>,
}

impl<T> Debounced<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an instance whose settled value is `initial`, immediately.
    pub fn new(initial: T, timers: Arc<dyn TimerHost>) -> Self {
        Self {
            shared: Arc::new(Shared {
                settled: Signal::new(initial),
                slot: Mutex::new(Slot {
                    phase: Phase::Settled,
                    generation: 0,
                }),
                timers,
            }),
        }
    }

    /// Submit the latest upstream value and return the settled value.
    ///
    /// Cancels any pending timer and schedules a new one for `delay`. The
    /// returned value is the one settled *before* this call: a new value is
    /// never published synchronously, not even with a zero delay.
    ///
    /// The returned read is untracked. An effect that forwards an upstream
    /// signal into `observe` depends on that signal only; if it also depended
    /// on the settled value, every settle would re-run it and, since every
    /// call restarts the window, schedule yet another settle. Read
    /// [`value`](Self::value) to render.
    pub fn observe(&self, value: T, delay: Duration) -> T {
        {
            let mut slot = self.shared.slot.lock();

            if matches!(slot.phase, Phase::TornDown) {
                drop(slot);
                tracing::trace!("observe after teardown ignored");
                return self.shared.settled.get_untracked();
            }
            if let Phase::Pending { timer, .. } = &slot.phase {
                self.shared.timers.cancel(*timer);
                tracing::debug!(timer = timer.id(), "debounce window restarted");
            }

            slot.generation += 1;
            let generation = slot.generation;
            let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);

            let scheduled = self.shared.timers.schedule(
                delay,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.fire(generation);
                    }
                }),
            );

            slot.phase = match scheduled {
                Ok(timer) => {
                    tracing::debug!(timer = timer.id(), generation, ?delay, "debounce timer scheduled");
                    Phase::Pending { value, timer, generation }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cannot schedule debounce timer; value will not settle");
                    Phase::Settled
                }
            };
        }

        self.shared.settled.get_untracked()
    }

    /// The settled value. Tracked when read inside an effect.
    pub fn value(&self) -> T {
        self.shared.settled.get()
    }

    /// The settled value as a signal, for subscribing.
    pub fn signal(&self) -> Signal<T> {
        self.shared.settled.clone()
    }

    /// Whether a newer value is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        matches!(self.shared.slot.lock().phase, Phase::Pending { .. })
    }

    /// The value waiting to settle, if any.
    pub fn pending_value(&self) -> Option<T> {
        match &self.shared.slot.lock().phase {
            Phase::Pending { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    /// Cancel any pending timer and stop accepting observations.
    ///
    /// Idempotent. Also runs on drop.
    pub fn teardown(&self) {
        self.shared.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        matches!(self.shared.slot.lock().phase, Phase::TornDown)
    }
}

impl<T> Drop for Debounced<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl<T> std::fmt::Debug for Debounced<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("settled", &self.shared.settled.get_untracked())
            .field("pending", &self.pending_value())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::SubscriberId;
    use crate::timer::{ManualTimers, UnavailableTimers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup<T: Clone + Send + Sync + 'static>(initial: T) -> (Arc<ManualTimers>, Debounced<T>) {
        let timers = Arc::new(ManualTimers::new());
        let debounced = Debounced::new(initial, timers.clone());
        (timers, debounced)
    }

    #[test]
    fn initial_value_is_immediate() {
        let (_timers, debounced) = setup("initial");
        assert_eq!(debounced.value(), "initial");
        assert!(!debounced.is_pending());
    }

    #[test]
    fn observe_returns_previous_settled_value() {
        let (timers, debounced) = setup(0);

        assert_eq!(debounced.observe(1, ms(100)), 0);
        assert_eq!(debounced.pending_value(), Some(1));

        timers.advance(ms(100));
        assert_eq!(debounced.observe(2, ms(100)), 1);
    }

    #[test]
    fn settles_exactly_at_delay_and_not_before() {
        let (timers, debounced) = setup(0);

        debounced.observe(100, ms(500));
        timers.advance(ms(499));
        assert_eq!(debounced.value(), 0);

        timers.advance(ms(1));
        assert_eq!(debounced.value(), 100);
        assert!(!debounced.is_pending());
    }

    #[test]
    fn repeated_equal_value_restarts_window() {
        let (timers, debounced) = setup("a");

        debounced.observe("b", ms(100));
        timers.advance(ms(80));
        debounced.observe("b", ms(100));
        timers.advance(ms(80));
        assert_eq!(debounced.value(), "a");

        timers.advance(ms(20));
        assert_eq!(debounced.value(), "b");
    }

    #[test]
    fn zero_delay_is_never_synchronous() {
        let (timers, debounced) = setup(1);

        assert_eq!(debounced.observe(2, Duration::ZERO), 1);
        assert_eq!(debounced.value(), 1);

        timers.run_pending();
        assert_eq!(debounced.value(), 2);
    }

    #[test]
    fn only_one_timer_is_ever_pending() {
        let (timers, debounced) = setup(0);
        for i in 1..=10 {
            debounced.observe(i, ms(50));
        }
        assert_eq!(timers.pending_count(), 1);

        timers.advance(ms(50));
        assert_eq!(debounced.value(), 10);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn teardown_cancels_and_is_idempotent() {
        let (timers, debounced) = setup(0);

        debounced.observe(1, ms(100));
        debounced.teardown();
        debounced.teardown();
        assert_eq!(timers.pending_count(), 0);

        timers.advance(ms(1000));
        assert_eq!(debounced.value(), 0);

        // Observations after teardown schedule nothing
        assert_eq!(debounced.observe(5, ms(10)), 0);
        assert_eq!(timers.pending_count(), 0);
        assert!(debounced.is_torn_down());
    }

    #[test]
    fn drop_cancels_pending_timer() {
        let (timers, debounced) = setup(0);
        debounced.observe(1, ms(100));

        drop(debounced);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(timers.advance(ms(100)), 0);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let (timers, debounced) = setup(0);
        debounced.observe(1, ms(100));
        let current = debounced.shared.slot.lock().generation;

        debounced.shared.fire(current - 1);
        assert_eq!(debounced.value(), 0);
        assert!(debounced.is_pending());

        timers.advance(ms(100));
        assert_eq!(debounced.value(), 1);
    }

    #[test]
    fn unavailable_timers_degrade_to_pass_through() {
        let debounced = Debounced::new("initial", Arc::new(UnavailableTimers));

        assert_eq!(debounced.observe("next", ms(10)), "initial");
        assert!(!debounced.is_pending());
        assert_eq!(debounced.value(), "initial");
    }

    #[test]
    fn settling_notifies_signal_subscribers_once() {
        let (timers, debounced) = setup(0);
        let notified = Arc::new(AtomicUsize::new(0));
        let notified_clone = notified.clone();
        debounced.signal().subscribe(SubscriberId::new(), move || {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        });

        debounced.observe(1, ms(10));
        debounced.observe(2, ms(10));
        debounced.observe(3, ms(10));
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        timers.advance(ms(10));
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }
}
