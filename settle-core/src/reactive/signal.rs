//! Signal Implementation
//!
//! A Signal holds a value and knows who depends on it.
//!
//! 1. Reading a signal inside a reactive context registers the running
//!    computation as a dependent (with the runtime).
//! 2. Setting a signal runs its direct notifiers, then asks the runtime to
//!    schedule dependent effects.
//!
//! Clones share the same value and subscribers; a `Signal` is a handle.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::Runtime;
use super::SubscriberId;

static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

type Notifier = Arc<dyn Fn() + Send + Sync>;

/// A reactive cell holding a value of type `T`.
///
/// ```rust,ignore
/// let count = Signal::new(0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    id: u64,
    value: Arc<RwLock<T>>,

    /// Explicit change callbacks, in subscription order.
    notifiers: Arc<RwLock<Vec<(SubscriberId, Notifier)>>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            id: next_signal_id(),
            value: Arc::new(RwLock::new(value)),
            notifiers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current value. Tracked when called inside a reactive context.
    pub fn get(&self) -> T {
        if let Some(subscriber_id) = ReactiveContext::current_subscriber() {
            ReactiveContext::track_dependency(self.id);
            Runtime::add_dependency(self.id, subscriber_id);
        }

        self.value.read().clone()
    }

    /// Current value, without registering a dependency.
    pub fn get_untracked(&self) -> T {
        self.value.read().clone()
    }

    /// Run `f` against the current value without cloning it. Untracked.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Replace the value and notify dependents.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.notify_subscribers();
        Runtime::notify_signal_change(self.id);
    }

    /// Replace the value with `f(current)`.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&self.value.read());
        self.set(new_value);
    }

    /// Register a callback that runs after every `set`.
    pub fn subscribe<F>(&self, subscriber_id: SubscriberId, notify: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifiers.write().push((subscriber_id, Arc::new(notify)));
    }

    /// Remove a subscriber and its callbacks. Unknown ids are ignored.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.notifiers.write().retain(|(id, _)| *id != subscriber_id);
    }

    fn notify_subscribers(&self) {
        // Snapshot first: a callback may subscribe or unsubscribe.
        let notifiers: Vec<Notifier> = self
            .notifiers
            .read()
            .iter()
            .map(|(_, notify)| Arc::clone(notify))
            .collect();

        for notify in notifiers {
            notify();
        }
    }

    /// Explicit subscribers plus computations whose last run read this signal.
    pub fn subscriber_count(&self) -> usize {
        self.notifiers.read().len() + Runtime::dependent_count(self.id)
    }
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Set the value only if it differs from the current one.
    ///
    /// Returns whether a change was published.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.value.read() == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            notifiers: Arc::clone(&self.notifiers),
        }
    }
}

impl<T> Drop for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if Arc::strong_count(&self.value) == 1 {
            Runtime::forget_signal(self.id);
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
