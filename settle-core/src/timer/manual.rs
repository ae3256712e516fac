//! Manually driven timer host.
//!
//! Time only moves when [`ManualTimers::advance`] is called. Timers fire in
//! deadline order, ties broken by scheduling order, and the clock is moved to
//! each deadline before its callback runs so callbacks that schedule further
//! timers see the right "now".

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use parking_lot::Mutex;

use super::{TimerCallback, TimerError, TimerHandle, TimerHost};

/// A virtual clock with a timer queue.
pub struct ManualTimers {
    state: Mutex<ClockState>,
}

struct ClockState {
    /// Elapsed virtual time since creation.
    now: Duration,

    /// Pending callbacks keyed by (deadline, handle).
    queue: BTreeMap<(Duration, TimerHandle), TimerCallback>,

    /// Deadline of every pending handle, for cancellation.
    deadlines: HashMap<TimerHandle, Duration>,
}

impl ManualTimers {
    /// Create a clock at time zero with no pending timers.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClockState {
                now: Duration::ZERO,
                queue: BTreeMap::new(),
                deadlines: HashMap::new(),
            }),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of timers that have not fired or been cancelled.
    pub fn pending_count(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Move the clock forward by `by`, firing every timer that falls due.
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut fired = 0;

        loop {
            let callback = {
                let mut state = self.state.lock();
                let due = match state.queue.first_key_value() {
                    Some((&(deadline, _), _)) => deadline <= target,
                    None => false,
                };
                if !due {
                    break;
                }

                let Some(((deadline, handle), callback)) = state.queue.pop_first() else {
                    break;
                };
                state.deadlines.remove(&handle);
                if deadline > state.now {
                    state.now = deadline;
                }
                tracing::trace!(timer = handle.id(), at = ?deadline, "manual timer fired");
                callback
            };

            // Lock released: the callback may schedule or cancel.
            callback();
            fired += 1;
        }

        let mut state = self.state.lock();
        if target > state.now {
            state.now = target;
        }
        fired
    }

    /// Fire everything that is already due without moving the clock.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }
}

impl Default for ManualTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost for ManualTimers {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> Result<TimerHandle, TimerError> {
        let handle = TimerHandle::next();
        let mut state = self.state.lock();
        let deadline = state.now + delay;
        state.queue.insert((deadline, handle), callback);
        state.deadlines.insert(handle, deadline);
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut state = self.state.lock();
        if let Some(deadline) = state.deadlines.remove(&handle) {
            state.queue.remove(&(deadline, handle));
        }
    }
}

impl std::fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualTimers")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> TimerCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |label: &'static str| -> TimerCallback {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(label))
        };
        (log, make)
    }

    #[test]
    fn fires_only_when_deadline_reached() {
        let timers = ManualTimers::new();
        let (log, cb) = recorder();

        timers.schedule(ms(100), cb("a")).unwrap();

        assert_eq!(timers.advance(ms(99)), 0);
        assert!(log.lock().is_empty());

        assert_eq!(timers.advance(ms(1)), 1);
        assert_eq!(*log.lock(), vec!["a"]);
        assert_eq!(timers.now(), ms(100));
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let timers = ManualTimers::new();
        let (log, cb) = recorder();

        timers.schedule(ms(30), cb("late")).unwrap();
        timers.schedule(ms(10), cb("first")).unwrap();
        timers.schedule(ms(10), cb("second")).unwrap();

        timers.advance(ms(50));
        assert_eq!(*log.lock(), vec!["first", "second", "late"]);
        assert_eq!(timers.now(), ms(50));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let timers = ManualTimers::new();
        let (log, cb) = recorder();

        let handle = timers.schedule(ms(10), cb("a")).unwrap();
        timers.cancel(handle);
        // Second cancel is a no-op
        timers.cancel(handle);

        assert_eq!(timers.pending_count(), 0);
        timers.advance(ms(100));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn zero_delay_waits_for_next_turn() {
        let timers = ManualTimers::new();
        let (log, cb) = recorder();

        timers.schedule(Duration::ZERO, cb("now")).unwrap();
        assert!(log.lock().is_empty());

        assert_eq!(timers.run_pending(), 1);
        assert_eq!(*log.lock(), vec!["now"]);
        assert_eq!(timers.now(), Duration::ZERO);
    }

    #[test]
    fn callbacks_can_schedule_within_window() {
        let timers = Arc::new(ManualTimers::new());
        let hits = Arc::new(Mutex::new(Vec::new()));

        let inner_timers = timers.clone();
        let inner_hits = hits.clone();
        timers
            .schedule(
                ms(10),
                Box::new(move || {
                    inner_hits.lock().push(inner_timers.now());
                    let hits = inner_hits.clone();
                    let clock = inner_timers.clone();
                    inner_timers
                        .schedule(ms(10), Box::new(move || hits.lock().push(clock.now())))
                        .unwrap();
                }),
            )
            .unwrap();

        timers.advance(ms(25));
        assert_eq!(*hits.lock(), vec![ms(10), ms(20)]);
        assert_eq!(timers.now(), ms(25));
    }
}
