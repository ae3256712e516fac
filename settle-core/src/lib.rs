//! Settle Core
//!
//! Reactive UI-state hooks for a small front-end template:
//!
//! - Reactive primitives (signals, effects with cleanup)
//! - A host timer facility with manual, tokio and "unavailable" hosts
//! - Hooks: trailing-edge debounce, toggle, mounted flag, media query, local
//!   storage mirror
//! - Helpers and layout constants shared by pages
//!
//! # Architecture
//!
//! - `reactive`: signals, effects and dependency tracking
//! - `timer`: the `schedule`/`cancel` facility hooks use to act later
//! - `hooks`: stateful hooks publishing into signals
//! - `storage`: key-value backends for `LocalStorage`
//! - `utils`, `config`: helpers, configuration and constants
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use settle_core::hooks::Debounced;
//! use settle_core::reactive::Effect;
//! use settle_core::timer::ManualTimers;
//!
//! let timers = Arc::new(ManualTimers::new());
//! let search = Debounced::new(String::new(), timers.clone());
//!
//! let settled = search.signal();
//! let _render = Effect::new(move || println!("searching for {:?}", settled.get()));
//!
//! search.observe("a".into(), Duration::from_millis(500));
//! search.observe("ab".into(), Duration::from_millis(500));
//! timers.advance(Duration::from_millis(500));
//! // prints: searching for "ab"
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod reactive;
pub mod storage;
pub mod timer;
pub mod utils;

pub use error::{Error, Result};
