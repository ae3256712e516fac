//! UI-state hooks.
//!
//! Each hook is a small stateful object that publishes into a
//! [`Signal`](crate::reactive::Signal), so effects that read it re-run when it
//! changes. Hooks that need time take an `Arc<dyn TimerHost>` and release any
//! timer they hold when dropped.
//!
//! - [`Debounced`]: trailing-edge debounce of a value
//! - [`Toggle`]: on/off flag
//! - [`Mounted`]: false until the host has completed a turn
//! - [`MediaQuery`]: whether a media query matches a viewport
//! - [`LocalStorage`]: a value mirrored into key-value storage

mod debounce;
mod local_storage;
mod media_query;
mod mounted;
mod toggle;

pub use debounce::Debounced;
pub use local_storage::LocalStorage;
pub use media_query::{Breakpoint, MediaQuery, MediaQueryList, Orientation, Viewport};
pub use mounted::Mounted;
pub use toggle::Toggle;
