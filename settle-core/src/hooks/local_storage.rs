//! A value mirrored into key-value storage.
//!
//! The stored form is JSON. On construction the stored value wins over the
//! initial one; a stored value that no longer deserializes is ignored with a
//! warning rather than failing the caller, the same way a browser page
//! tolerates a stale `localStorage` entry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::reactive::Signal;
use crate::storage::Storage;

/// A signal whose value is persisted under `key`.
pub struct LocalStorage<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    key: String,
    initial: T,
    value: Signal<T>,
    storage: Arc<dyn Storage>,
}

impl<T> LocalStorage<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Load `key` from `storage`, falling back to `initial`.
    pub fn new(key: impl Into<String>, initial: T, storage: Arc<dyn Storage>) -> Self {
        let key = key.into();
        let value = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "ignoring unreadable stored value");
                    initial.clone()
                }
            },
            Ok(None) => initial.clone(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "storage read failed; using initial value");
                initial.clone()
            }
        };

        Self {
            key,
            initial,
            value: Signal::new(value),
            storage,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value. Tracked inside effects.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Publish `value` and write it through to storage.
    ///
    /// The in-memory value is updated even if persisting fails; the error is
    /// returned so the caller can decide whether that matters.
    pub fn set(&self, value: T) -> Result<()> {
        let raw = serde_json::to_string(&value)?;
        self.value.set(value);
        self.storage.set(&self.key, &raw)
    }

    /// Replace the value with `f(current)` and persist it.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        let next = self.value.with(f);
        self.set(next)
    }

    /// Delete the stored entry and go back to the initial value.
    pub fn remove(&self) -> Result<()> {
        self.storage.remove(&self.key)?;
        self.value.set(self.initial.clone());
        Ok(())
    }

    pub fn signal(&self) -> Signal<T> {
        self.value.clone()
    }
}

impl<T> std::fmt::Debug for LocalStorage<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("key", &self.key)
            .field("value", &self.value.get_untracked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        font_size: u8,
    }

    fn prefs() -> Prefs {
        Prefs {
            theme: "light".into(),
            font_size: 14,
        }
    }

    #[test]
    fn falls_back_to_initial_when_absent() {
        let storage = Arc::new(MemoryStorage::new());
        let stored = LocalStorage::new("prefs", prefs(), storage.clone());
        assert_eq!(stored.get(), prefs());
        assert!(storage.is_empty());
    }

    #[test]
    fn set_writes_through_and_reloads() {
        let storage = Arc::new(MemoryStorage::new());
        let stored = LocalStorage::new("prefs", prefs(), storage.clone());

        stored
            .update(|p| Prefs {
                theme: "dark".into(),
                ..p.clone()
            })
            .unwrap();

        let reloaded = LocalStorage::new("prefs", prefs(), storage.clone());
        assert_eq!(reloaded.get().theme, "dark");
        assert_eq!(reloaded.get().font_size, 14);
    }

    #[test]
    fn unreadable_value_uses_initial() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("count", "{not json").unwrap();

        let stored = LocalStorage::new("count", 5u32, storage);
        assert_eq!(stored.get(), 5);
    }

    #[test]
    fn remove_resets_to_initial() {
        let storage = Arc::new(MemoryStorage::new());
        let stored = LocalStorage::new("count", 0u32, storage.clone());

        stored.set(9).unwrap();
        assert_eq!(storage.get("count").unwrap().as_deref(), Some("9"));

        stored.remove().unwrap();
        assert_eq!(stored.get(), 0);
        assert_eq!(storage.get("count").unwrap(), None);
    }
}
