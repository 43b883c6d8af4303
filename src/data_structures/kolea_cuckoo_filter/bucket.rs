// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Buckets of fingerprint slots and the table that holds them.

use crate::data_structures::kolea_cuckoo_filter::hash::Fingerprint;

/// A fingerprint slot. `None` is the empty sentinel, so fingerprint `0` is storable.
pub type Slot = Option<Fingerprint>;

/// A fixed-capacity group of fingerprint slots, filled first-fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    slots: Box<[Slot]>,
}

impl Bucket {
    /// Creates an empty bucket with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
        }
    }

    /// The slots in order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether any slot holds `fingerprint`.
    pub fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.slots.contains(&Some(fingerprint))
    }

    /// Stores `fingerprint` in the first empty slot, returning its index.
    pub(crate) fn try_insert(&mut self, fingerprint: Fingerprint) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(fingerprint);
        Some(index)
    }

    /// Clears the first slot holding `fingerprint`, returning its index.
    pub(crate) fn remove(&mut self, fingerprint: Fingerprint) -> Option<usize> {
        let index = self.slots.iter().position(|slot| *slot == Some(fingerprint))?;
        self.slots[index] = None;
        Some(index)
    }

    /// Puts `slot` at `index` and returns what was there.
    pub(crate) fn replace(&mut self, index: usize, slot: Slot) -> Slot {
        std::mem::replace(&mut self.slots[index], slot)
    }
}

/// The bucket table: `bucket_count` buckets of `bucket_size` slots each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    buckets: Vec<Bucket>,
    bucket_size: usize,
}

impl Table {
    /// Allocates a table with every slot empty.
    pub fn new(bucket_count: usize, bucket_size: usize) -> Self {
        Self {
            buckets: (0..bucket_count).map(|_| Bucket::new(bucket_size)).collect(),
            bucket_size,
        }
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Slots per bucket.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// All buckets in index order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The bucket at `index`, if in range.
    pub fn bucket(&self, index: usize) -> Option<&Bucket> {
        self.buckets.get(index)
    }

    pub(crate) fn bucket_mut(&mut self, index: usize) -> &mut Bucket {
        &mut self.buckets[index]
    }

    /// Total occupied slots.
    pub fn occupied(&self) -> usize {
        self.buckets.iter().map(Bucket::occupied).sum()
    }

    /// Total slots.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * self.bucket_size
    }
}
