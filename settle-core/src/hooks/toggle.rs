//! Boolean toggle state.

use crate::reactive::Signal;

/// An on/off flag backed by a signal.
#[derive(Clone, Debug)]
pub struct Toggle {
    state: Signal<bool>,
}

impl Toggle {
    pub fn new(initial: bool) -> Self {
        Self {
            state: Signal::new(initial),
        }
    }

    /// Current state. Tracked inside effects.
    pub fn get(&self) -> bool {
        self.state.get()
    }

    /// Flip the state and return the new one.
    pub fn toggle(&self) -> bool {
        let next = !self.state.get_untracked();
        self.state.set(next);
        next
    }

    /// Set an explicit state. Dependents are only notified on change.
    pub fn set(&self, on: bool) {
        self.state.set_if_changed(on);
    }

    pub fn set_on(&self) {
        self.set(true);
    }

    pub fn set_off(&self) {
        self.set(false);
    }

    pub fn signal(&self) -> Signal<bool> {
        self.state.clone()
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_back_and_forth() {
        let toggle = Toggle::default();
        assert!(!toggle.get());
        assert!(toggle.toggle());
        assert!(!toggle.toggle());
    }

    #[test]
    fn explicit_setters() {
        let toggle = Toggle::new(false);
        toggle.set_on();
        assert!(toggle.get());
        toggle.set_on();
        assert!(toggle.get());
        toggle.set_off();
        assert!(!toggle.get());
    }
}
