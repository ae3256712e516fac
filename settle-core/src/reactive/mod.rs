//! Reactive Primitives
//!
//! The host update loop the hooks publish into: signals hold state, effects
//! react to it.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. Reading it inside a tracking
//! context (an effect run) registers that context as a dependent; setting it
//! re-runs every dependent effect.
//!
//! ## Effects
//!
//! An Effect synchronizes reactive state with the outside world: rendering a
//! line to the terminal, logging, writing a mirror to storage. Effects can
//! return a cleanup that is guaranteed to run before the next execution and on
//! disposal.
//!
//! # Implementation Notes
//!
//! Dependency tracking is automatic. A thread-local stack records which
//! computation is running; signal reads consult it and report to the global
//! [`Runtime`].

mod signal;
mod context;
mod subscriber;
mod effect;
mod runtime;

pub use signal::Signal;
pub use context::ReactiveContext;
pub use subscriber::SubscriberId;
pub use effect::{Cleanup, Effect};
pub use runtime::{Runtime, Reactive, ReactiveHandle};
