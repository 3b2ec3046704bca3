//! Specialized collection types

use std::collections::HashMap;
use std::hash::Hash;

pub use slotmap::{SlotMap, new_key_type};

/// Insertion-ordered keyed list that tolerates mutation while being walked
///
/// Iteration that may trigger inserts or removals (observer callbacks,
/// entity ticks) goes through [`ProcessList::snapshot`], which copies the
/// current values out so the list itself can change underneath the walk.
/// Keys are unique: inserting an existing key is a no-op.
///
/// Lookups go through a key index. Removal leaves a hole in the slot vector
/// that is compacted once holes outnumber live entries.
#[derive(Debug, Clone)]
pub struct ProcessList<K, V> {
    slots: Vec<Option<(K, V)>>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash, V: Clone> ProcessList<K, V> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a value under `key`, returns false if the key was already present
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.slots.len());
        self.slots.push(Some((key, value)));
        true
    }

    /// Remove the value stored under `key`, preserving the order of the rest
    pub fn remove(&mut self, key: K) -> Option<V> {
        let slot = self.index.remove(&key)?;
        let (_, value) = self.slots[slot].take()?;
        if self.slots.len() > 2 * self.index.len() {
            self.compact();
        }
        Some(value)
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        for (slot, (key, _)) in self.slots.iter().flatten().enumerate() {
            self.index.insert(*key, slot);
        }
    }

    /// Check whether `key` is present
    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    /// Look up the value stored under `key`
    pub fn get(&self, key: K) -> Option<&V> {
        let slot = *self.index.get(&key)?;
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.iter().flatten().map(|(k, _)| *k)
    }

    /// Values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().flatten().map(|(_, v)| v)
    }

    /// Copy of the current values, safe to walk while the list is mutated
    pub fn snapshot(&self) -> Vec<V> {
        self.values().cloned().collect()
    }
}

impl<K: Copy + Eq + Hash, V: Clone> Default for ProcessList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut list = ProcessList::new();

        assert!(list.insert(1, "a"));
        assert!(!list.insert(1, "b"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(1), Some(&"a"));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut list = ProcessList::new();
        list.insert(1, 'a');
        list.insert(2, 'b');
        list.insert(3, 'c');

        assert_eq!(list.remove(2), Some('b'));
        assert_eq!(list.remove(2), None);
        assert_eq!(list.keys().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_snapshot_survives_mutation() {
        let mut list = ProcessList::new();
        list.insert(1, 10);
        list.insert(2, 20);

        for value in list.snapshot() {
            list.remove(value / 10);
            list.insert(value, value);
        }

        assert_eq!(list.keys().collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn test_removal_compacts_and_keeps_lookups() {
        let mut list = ProcessList::new();
        for key in 0..100 {
            list.insert(key, key * 2);
        }
        for key in (0..100).filter(|k| k % 4 != 3) {
            assert_eq!(list.remove(key), Some(key * 2));
        }

        assert_eq!(list.len(), 25);
        assert!(list.slots.len() <= 2 * list.len());
        assert_eq!(list.get(99), Some(&198));
        assert!(!list.contains(98));
        assert_eq!(list.keys().take(3).collect::<Vec<_>>(), vec![3, 7, 11]);

        assert!(list.insert(0, 1));
        assert_eq!(list.keys().last(), Some(0));
        assert_eq!(list.get(0), Some(&1));
    }
}
