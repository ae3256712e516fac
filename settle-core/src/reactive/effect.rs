//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever a signal it
//! read changes. It is the host's "render": hooks publish into signals, and
//! effects that read those signals react.
//!
//! # How Effects Work
//!
//! 1. On creation the effect runs once to discover its dependencies.
//! 2. When any dependency changes the runtime schedules it and it re-runs.
//! 3. Every run starts from an empty dependency set, so branches that stop
//!    reading a signal stop depending on it.
//! 4. A change that lands while the effect is already running is queued,
//!    not dropped: the running caller goes around again once the body returns.
//!
//! # Cleanup
//!
//! [`Effect::with_cleanup`] takes a function that returns a cleanup closure.
//! The cleanup runs before the next execution and when the effect is disposed
//! or its last handle is dropped, whichever comes first. Resources acquired by
//! one run are therefore always released.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::context::ReactiveContext;
use super::runtime::{Reactive, ReactiveHandle, Runtime};
use super::subscriber::SubscriberId;

static EFFECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_effect_id() -> u64 {
    EFFECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Closure returned by an effect run to release what the run acquired.
pub type Cleanup = Box<dyn FnOnce() + Send + 'static>;

type RunFn = dyn Fn() -> Option<Cleanup> + Send + Sync;

struct EffectInner {
    id: u64,
    subscriber_id: SubscriberId,
    run: Box<RunFn>,
    dependencies: Mutex<HashSet<u64>>,
    cleanup: Mutex<Option<Cleanup>>,
    disposed: AtomicBool,
    /// A dependency changed since the current or last run started.
    dirty: AtomicBool,
    /// Held by whichever caller is draining the effect.
    running: AtomicBool,
    run_count: AtomicUsize,
}

impl EffectInner {
    fn execute(&self) {
        self.mark_dirty();
        self.drain();
    }

    /// Run until no change is left unseen.
    ///
    /// A caller that finds the effect already running, on this thread (a body
    /// writing a signal it reads) or another (a timer settling on a worker),
    /// leaves it dirty and returns. The holder runs again before letting go.
    fn drain(&self) {
        loop {
            if self.running.swap(true, Ordering::SeqCst) {
                tracing::trace!(effect = self.id, "effect busy, change queued");
                return;
            }

            while self.dirty.swap(false, Ordering::SeqCst) && !self.disposed.load(Ordering::SeqCst) {
                self.run_once();
            }

            self.running.store(false, Ordering::SeqCst);
            // A change may have landed between the last swap and the release.
            if self.disposed.load(Ordering::SeqCst) || !self.dirty.load(Ordering::SeqCst) {
                return;
            }
        }
    }

    fn run_once(&self) {
        self.run_cleanup();
        Runtime::clear_dependencies(self.subscriber_id);

        let cleanup = {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            let cleanup = (self.run)();
            *self.dependencies.lock() = ReactiveContext::get_dependencies().into_iter().collect();
            cleanup
        };

        // Disposed mid-run: release immediately instead of parking it.
        if self.disposed.load(Ordering::SeqCst) {
            if let Some(cleanup) = cleanup {
                cleanup();
            }
        } else {
            *self.cleanup.lock() = cleanup;
        }

        self.run_count.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(effect = self.id, "effect ran");
    }

    fn run_cleanup(&self) {
        let cleanup = self.cleanup.lock().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.run_cleanup();
        Runtime::clear_dependencies(self.subscriber_id);
        tracing::trace!(effect = self.id, "effect disposed");
    }
}

impl Reactive for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn schedule(&self) {
        self.drain();
    }
}

/// Keeps the runtime registration alive and disposes on last drop.
struct Registration {
    inner: Arc<EffectInner>,
    _handle: ReactiveHandle,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

/// A side-effecting computation that re-runs when its dependencies change.
///
/// ```rust,ignore
/// let count = Signal::new(0);
/// let c = count.clone();
/// let effect = Effect::new(move || println!("count = {}", c.get()));
/// count.set(5); // prints "count = 5"
/// ```
#[derive(Clone)]
pub struct Effect {
    registration: Arc<Registration>,
}

impl Effect {
    /// Create an effect and run it once.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let effect = Self::new_lazy(run);
        effect.execute();
        effect
    }

    /// Create an effect without running it. It has no dependencies until the
    /// first [`execute`](Self::execute).
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::build(Box::new(move || {
            run();
            None
        }))
    }

    /// Create an effect whose runs return a cleanup, and run it once.
    pub fn with_cleanup<F, C>(run: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: FnOnce() + Send + 'static,
    {
        let effect = Self::build(Box::new(move || Some(Box::new(run()) as Cleanup)));
        effect.execute();
        effect
    }

    fn build(run: Box<RunFn>) -> Self {
        let inner = Arc::new(EffectInner {
            id: next_effect_id(),
            subscriber_id: SubscriberId::new(),
            run,
            dependencies: Mutex::new(HashSet::new()),
            cleanup: Mutex::new(None),
            disposed: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
            running: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
        });
        let handle = Runtime::register(inner.clone());

        Self {
            registration: Arc::new(Registration {
                inner,
                _handle: handle,
            }),
        }
    }

    fn inner(&self) -> &EffectInner {
        &self.registration.inner
    }

    pub fn id(&self) -> u64 {
        self.inner().id
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner().subscriber_id
    }

    /// Run the effect now (after releasing the previous run's cleanup).
    pub fn execute(&self) {
        self.inner().execute();
    }

    /// Re-run if a dependency changed since the last run.
    pub fn schedule(&self) {
        self.inner().schedule();
    }

    /// Stop the effect for good and release its cleanup. Idempotent.
    pub fn dispose(&self) {
        self.inner().dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner().disposed.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> usize {
        self.inner().run_count.load(Ordering::SeqCst)
    }

    pub fn dependency_count(&self) -> usize {
        self.inner().dependencies.lock().len()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use std::sync::atomic::AtomicI32;

    fn counter() -> (Arc<AtomicI32>, Arc<AtomicI32>) {
        let count = Arc::new(AtomicI32::new(0));
        (count.clone(), count)
    }

    #[test]
    fn effect_runs_on_creation() {
        let (count, inner) = counter();
        let _effect = Effect::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn effect_lazy_does_not_run_on_creation() {
        let (count, inner) = counter();
        let effect = Effect::new_lazy(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(effect.run_count(), 0);

        effect.execute();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn effect_reruns_when_signal_changes() {
        let signal = Signal::new(1);
        let seen = Arc::new(AtomicI32::new(0));

        let s = signal.clone();
        let seen_clone = seen.clone();
        let effect = Effect::new(move || {
            seen_clone.store(s.get(), Ordering::SeqCst);
        });
        assert_eq!(effect.dependency_count(), 1);

        signal.set(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(effect.run_count(), 2);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let signal = Signal::new(0);
        let (count, inner) = counter();
        let s = signal.clone();
        let effect = Effect::new(move || {
            s.get();
            inner.fetch_add(1, Ordering::SeqCst);
        });

        effect.dispose();
        effect.dispose();
        assert!(effect.is_disposed());

        signal.set(1);
        effect.schedule();
        effect.execute();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_effect_stops_reacting() {
        let signal = Signal::new(0);
        let (count, inner) = counter();
        let s = signal.clone();
        let effect = Effect::new(move || {
            s.get();
            inner.fetch_add(1, Ordering::SeqCst);
        });

        drop(effect);
        signal.set(1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cleanup_runs_before_rerun_and_on_dispose() {
        let signal = Signal::new(0);
        let log = Arc::new(Mutex::new(Vec::new()));

        let s = signal.clone();
        let log_clone = log.clone();
        let effect = Effect::with_cleanup(move || {
            let value = s.get();
            log_clone.lock().push(format!("acquire {value}"));
            let log = log_clone.clone();
            move || log.lock().push(format!("release {value}"))
        });

        signal.set(1);
        effect.dispose();

        assert_eq!(
            *log.lock(),
            vec!["acquire 0", "release 0", "acquire 1", "release 1"]
        );
    }

    #[test]
    fn clone_shares_state() {
        let effect1 = Effect::new(|| {});
        let effect2 = effect1.clone();

        assert_eq!(effect1.id(), effect2.id());
        effect1.execute();
        assert_eq!(effect2.run_count(), 2);

        // Dropping one clone keeps the effect alive
        drop(effect1);
        assert!(!effect2.is_disposed());
        effect2.dispose();
        assert!(effect2.is_disposed());
    }

    #[test]
    fn self_triggering_effect_reruns_without_recursing() {
        let signal = Signal::new(0);
        let s = signal.clone();
        let effect = Effect::new(move || {
            let v = s.get();
            if v < 3 {
                s.set(v + 1);
            }
        });

        // Each nested set is queued and picked up after the run finishes.
        assert_eq!(signal.get_untracked(), 3);
        assert_eq!(effect.run_count(), 4);
    }

    #[test]
    fn change_during_a_run_on_another_thread_is_not_lost() {
        let settled = Signal::new(0);
        let slow = Signal::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let effect = {
            let settled = settled.clone();
            let slow = slow.clone();
            let seen = seen.clone();
            Effect::new(move || {
                let value = settled.get();
                if slow.get() {
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                seen.lock().push(value);
            })
        };

        let render = {
            let slow = slow.clone();
            std::thread::spawn(move || slow.set(true))
        };
        std::thread::sleep(std::time::Duration::from_millis(30));
        settled.set(42);
        render.join().unwrap();

        assert_eq!(seen.lock().last(), Some(&42));
        assert!(effect.run_count() >= 3);
    }

    #[test]
    fn schedule_without_a_change_does_not_run() {
        let effect = Effect::new(|| {});
        effect.schedule();
        assert_eq!(effect.run_count(), 1);
    }
}
