//! Reactive Context
//!
//! Tracks which computation is currently running so that signal reads can be
//! attributed to it. Each thread keeps a stack of frames; entering a context
//! pushes a frame and the returned guard pops it, so nested computations (an
//! effect that runs a hook that reads a signal) attribute reads to the
//! innermost one.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// One running computation and the signals it has read so far.
#[derive(Debug)]
struct Frame {
    subscriber_id: SubscriberId,
    /// Signal ids, deduplicated, in first-read order.
    dependencies: SmallVec<[u64; 4]>,
}

/// Guard for an entered reactive context.
///
/// Dropping the guard leaves the context, including during unwinding.
pub struct ReactiveContext {
    subscriber_id: SubscriberId,
}

impl ReactiveContext {
    /// Enter a context for `subscriber_id`.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                subscriber_id,
                dependencies: SmallVec::new(),
            });
        });

        Self { subscriber_id }
    }

    /// Whether any context is active on this thread.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The innermost running subscriber, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|frame| frame.subscriber_id))
    }

    /// Record a read of `signal_id` in the innermost frame.
    pub fn track_dependency(signal_id: u64) {
        CONTEXT_STACK.with(|stack| {
            if let Some(frame) = stack.borrow_mut().last_mut() {
                if !frame.dependencies.contains(&signal_id) {
                    frame.dependencies.push(signal_id);
                }
            }
        });
    }

    /// Signals read so far in the innermost frame.
    pub fn get_dependencies() -> Vec<u64> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|frame| frame.dependencies.to_vec())
                .unwrap_or_default()
        })
    }

    /// Run `f` with tracking suspended.
    ///
    /// Reads inside `f` are not attributed to the surrounding computation.
    pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
        let saved = CONTEXT_STACK.with(|stack| std::mem::take(&mut *stack.borrow_mut()));
        let result = f();
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let inner = std::mem::replace(&mut *stack, saved);
            debug_assert!(inner.is_empty(), "context leaked out of untracked section");
        });
        result
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, frame.subscriber_id
                );
            }
        });
    }
}
