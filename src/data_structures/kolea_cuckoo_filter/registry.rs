// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Exact registry of live keys.
//!
//! Lookups never consult the registry. It rejects exact duplicates, lists live
//! keys for reports, and is replayed in insertion order when the table grows.

use fnv::FnvHashSet;

use crate::data_structures::kolea_cuckoo_filter::hash::Key;

/// Insertion-ordered set of keys that were successfully inserted.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    order: Vec<Key>,
    members: FnvHashSet<Key>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: Key) -> bool {
        self.members.contains(&key)
    }

    /// Registers `key`; returns `false` if it already was.
    pub fn insert(&mut self, key: Key) -> bool {
        if !self.members.insert(key) {
            return false;
        }
        self.order.push(key);
        true
    }

    /// Unregisters `key`, keeping the order of the others.
    pub fn remove(&mut self, key: Key) -> bool {
        if !self.members.remove(&key) {
            return false;
        }
        if let Some(position) = self.order.iter().position(|&k| k == key) {
            self.order.remove(position);
        }
        true
    }

    /// Keys in insertion order.
    pub fn as_slice(&self) -> &[Key] {
        &self.order
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_insertion_order() {
        let mut registry = KeyRegistry::new();
        for key in [9, -3, 4, 0] {
            assert!(registry.insert(key));
        }
        assert!(registry.remove(-3));
        assert_eq!(registry.as_slice(), &[9, 4, 0]);
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut registry = KeyRegistry::new();
        assert!(registry.insert(1));
        assert!(!registry.insert(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_missing() {
        let mut registry = KeyRegistry::new();
        assert!(!registry.remove(42));
        assert!(registry.is_empty());
    }
}
