//! Reactive Runtime
//!
//! The runtime connects signals to the computations that read them.
//!
//! 1. Effects register with the runtime and get a [`ReactiveHandle`] back.
//! 2. When a registered computation reads a signal inside its context, the
//!    signal records the dependency here.
//! 3. When a signal is set, the runtime marks every dependent dirty and then
//!    schedules each of them.
//!
//! The registry holds weak references only, so an effect that is dropped
//! without being disposed simply stops being notified. No runtime lock is held
//! while a dependent is scheduled: effects are free to read and write signals
//! (and so re-enter the runtime) while they run.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::subscriber::SubscriberId;

/// A computation the runtime can notify.
pub trait Reactive: Send + Sync {
    /// Identity used for dependency bookkeeping.
    fn subscriber_id(&self) -> SubscriberId;

    /// Record that a dependency changed since the last run.
    fn mark_dirty(&self);

    /// Re-run the computation if it is dirty.
    fn schedule(&self);
}

/// Registration token. Dropping it unregisters the computation.
#[derive(Debug)]
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
}

impl ReactiveHandle {
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

/// Process-wide reactive runtime.
pub struct Runtime;

type Registry = RwLock<HashMap<SubscriberId, Weak<dyn Reactive>>>;
type SignalSubscribers = RwLock<HashMap<u64, Vec<SubscriberId>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static SIGNAL_SUBSCRIBERS: OnceLock<SignalSubscribers> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn signal_subscribers() -> &'static SignalSubscribers {
    SIGNAL_SUBSCRIBERS.get_or_init(|| RwLock::new(HashMap::new()))
}

impl Runtime {
    /// Register a computation.
    pub fn register(reactive: Arc<dyn Reactive>) -> ReactiveHandle {
        let id = reactive.subscriber_id();
        registry().write().insert(id, Arc::downgrade(&reactive));
        tracing::trace!(subscriber = %id, "registered with runtime");
        ReactiveHandle { subscriber_id: id }
    }

    fn unregister(id: SubscriberId) {
        registry().write().remove(&id);
        Self::clear_dependencies(id);
        tracing::trace!(subscriber = %id, "unregistered from runtime");
    }

    /// Record that `subscriber_id` read `signal_id`.
    pub fn add_dependency(signal_id: u64, subscriber_id: SubscriberId) {
        let mut subscribers = signal_subscribers().write();
        let entry = subscribers.entry(signal_id).or_default();
        if !entry.contains(&subscriber_id) {
            entry.push(subscriber_id);
        }
    }

    /// Forget every dependency of `subscriber_id`.
    ///
    /// Called before a computation re-runs so stale dependencies drop out.
    pub fn clear_dependencies(subscriber_id: SubscriberId) {
        let mut subscribers = signal_subscribers().write();
        subscribers.retain(|_, subs| {
            subs.retain(|s| *s != subscriber_id);
            !subs.is_empty()
        });
    }

    /// Forget a signal entirely (its last handle was dropped).
    pub fn forget_signal(signal_id: u64) {
        signal_subscribers().write().remove(&signal_id);
    }

    /// Number of registered subscribers depending on `signal_id`.
    pub fn dependent_count(signal_id: u64) -> usize {
        signal_subscribers()
            .read()
            .get(&signal_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Propagate a change of `signal_id` to its dependents.
    pub fn notify_signal_change(signal_id: u64) {
        let subscriber_ids = signal_subscribers()
            .read()
            .get(&signal_id)
            .cloned()
            .unwrap_or_default();

        if subscriber_ids.is_empty() {
            return;
        }

        let dependents: Vec<Arc<dyn Reactive>> = {
            let registry = registry().read();
            subscriber_ids
                .iter()
                .filter_map(|sub_id| registry.get(sub_id).and_then(|weak| weak.upgrade()))
                .collect()
        };

        // Mark every dependent before scheduling any.
        for reactive in &dependents {
            reactive.mark_dirty();
        }

        tracing::trace!(signal = signal_id, effects = dependents.len(), "signal changed");
        for reactive in dependents {
            reactive.schedule();
        }
    }

    /// The computation currently being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Whether signal reads are currently being tracked.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}
