// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded FIFO set of dedup keys.

use std::collections::VecDeque;

use hashbrown::HashSet;

/// Default number of keys remembered per subscription.
pub const DEFAULT_CAPACITY: usize = 100;

/// A set of dedup keys with first-in, first-out eviction.
///
/// The set and the insertion queue always hold the same keys. When full,
/// inserting a new key evicts the oldest *inserted* key; looking a key up
/// never refreshes it.
#[derive(Clone, Debug)]
pub struct DedupCache {
    set: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DedupCache {
    /// A cache holding at most `capacity` keys. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            set: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of keys.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `key` has been seen and not yet evicted.
    pub fn contains(&self, key: &str) -> bool {
        self.set.contains(key)
    }

    /// Insert `key`, evicting the oldest key when full.
    ///
    /// Returns `false` (and changes nothing) if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.set.contains(&key) {
            return false;
        }
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.set.remove(&oldest);
                }
                None => break,
            }
        }
        self.set.insert(key.clone());
        self.order.push_back(key);
        true
    }

    /// Forget every key.
    pub fn clear(&mut self) {
        self.set.clear();
        self.order.clear();
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut cache = DedupCache::new(4);
        assert!(cache.insert("fire:3"));
        assert!(!cache.insert("fire:3"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_oldest_inserted_first() {
        let mut cache = DedupCache::new(2);
        cache.insert("a");
        cache.insert("b");
        // Re-seeing "a" does not refresh it.
        assert!(!cache.insert("a"));
        cache.insert("c");
        assert_eq!(cache.iter().collect::<Vec<_>>(), ["b", "c"]);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn keeps_last_hundred_of_one_fifty() {
        let mut cache = DedupCache::default();
        for i in 0..150 {
            assert!(cache.insert(format!("k{i}")));
        }
        assert_eq!(cache.len(), 100);
        let expected: Vec<String> = (50..150).map(|i| format!("k{i}")).collect();
        assert_eq!(cache.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut cache = DedupCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("x");
        cache.insert("y");
        assert_eq!(cache.iter().collect::<Vec<_>>(), ["y"]);
        cache.clear();
        assert!(cache.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_and_queue_stay_in_step(
                capacity in 1_usize..16,
                keys in prop::collection::vec(0_u8..32, 0..64),
            ) {
                let mut cache = DedupCache::new(capacity);
                for k in &keys {
                    cache.insert(k.to_string());
                    prop_assert!(cache.len() <= capacity);
                    prop_assert_eq!(cache.set.len(), cache.order.len());
                    prop_assert!(cache.contains(&k.to_string()));
                }
            }
        }
    }
}
