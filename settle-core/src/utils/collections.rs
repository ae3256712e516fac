//! Array and object helpers.

use std::hash::Hash;

use indexmap::IndexMap;
use rand::Rng;
use serde_json::Value;

/// A shuffled copy of `items`, using the thread-local RNG.
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(items, &mut rand::thread_rng())
}

/// A shuffled copy of `items` (Fisher–Yates), using `rng`.
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Group items by key. Groups appear in order of their first item.
pub fn group_by<T, K, I, F>(items: I, key: F) -> IndexMap<K, Vec<T>>
where
    I: IntoIterator<Item = T>,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

/// Drop the `null` members of a JSON object. Other values pass through.
///
/// Only the top level is filtered.
pub fn remove_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => other,
    }
}
