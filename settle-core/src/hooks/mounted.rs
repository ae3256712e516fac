//! Mounted flag.
//!
//! The first render of a component always sees `false`; the flag flips on
//! the next scheduler turn, like a mount effect that runs after the first
//! paint. Content that differs between a pre-render and the live page (the
//! clock, for one) waits for it. Without a timer host the flag stays `false`,
//! which is exactly the pre-render case.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::reactive::Signal;
use crate::timer::{TimerHandle, TimerHost};

/// A flag that becomes `true` once the host has completed a turn.
pub struct Mounted {
    flag: Signal<bool>,
    timers: Arc<dyn TimerHost>,
    pending: Mutex<Option<TimerHandle>>,
}

impl Mounted {
    pub fn new(timers: Arc<dyn TimerHost>) -> Self {
        let flag = Signal::new(false);
        let target = flag.clone();

        let flip = Box::new(move || {
            target.set_if_changed(true);
        });
        let pending = match timers.schedule(Duration::ZERO, flip) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "no timer host; component will never mount");
                None
            }
        };

        Self {
            flag,
            timers,
            pending: Mutex::new(pending),
        }
    }

    /// Whether the mount turn has happened. Tracked inside effects.
    pub fn is_mounted(&self) -> bool {
        self.flag.get()
    }

    pub fn signal(&self) -> Signal<bool> {
        self.flag.clone()
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.lock().take() {
            self.timers.cancel(handle);
        }
    }
}

impl std::fmt::Debug for Mounted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mounted")
            .field("mounted", &self.flag.get_untracked())
            .finish()
    }
}
