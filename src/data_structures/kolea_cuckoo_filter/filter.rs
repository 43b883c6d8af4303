// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Main implementation of the Kolea Cuckoo Filter.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::data_structures::kolea_cuckoo_filter::bucket::{Bucket, Table};
use crate::data_structures::kolea_cuckoo_filter::config::{KoleaCuckooFilterConfig, MAX_TABLE_SLOTS};
use crate::data_structures::kolea_cuckoo_filter::error::{KoleaCuckooFilterError, Result};
use crate::data_structures::kolea_cuckoo_filter::hash::{CandidateBuckets, Fingerprint, Key, KoleaHasher};
use crate::data_structures::kolea_cuckoo_filter::registry::KeyRegistry;
use crate::data_structures::kolea_cuckoo_filter::report::{
    FilterObserver, HighlightIntent, OperationKind, OperationReport, TableSnapshot,
};

/// Where a fingerprint ended up after a placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Stored first-fit in one of its candidate buckets
    Direct,
    /// Stored after evicting `kicks` fingerprints along a relocation chain
    Relocated { kicks: usize },
    /// The kick budget ran out; the table is exactly as before the attempt
    Exhausted,
}

/// Places a fingerprint first-fit in its candidate buckets, falling back to
/// relocation bounded by `max_kicks`.
///
/// Every eviction is journaled so an exhausted chain can be undone. This keeps
/// a failed attempt from dropping the fingerprint that was in hand when the
/// budget ran out.
fn place<R: Rng>(
    table: &mut Table,
    hasher: &KoleaHasher,
    rng: &mut R,
    max_kicks: usize,
    candidates: &CandidateBuckets,
) -> Placement {
    let fingerprint = candidates.fingerprint;
    if table.bucket_mut(candidates.primary).try_insert(fingerprint).is_some()
        || table.bucket_mut(candidates.secondary).try_insert(fingerprint).is_some()
    {
        return Placement::Direct;
    }

    let mut journal: Vec<(usize, usize, Fingerprint)> = Vec::new();
    let mut current = candidates.primary;
    let mut in_hand = fingerprint;

    for kick in 1..=max_kicks {
        let slot = rng.random_range(0..table.bucket_size());
        let evicted = match table.bucket_mut(current).replace(slot, Some(in_hand)) {
            Some(evicted) => evicted,
            None => return Placement::Relocated { kicks: kick },
        };
        journal.push((current, slot, evicted));

        current = hasher.alternate(evicted, current);
        in_hand = evicted;
        trace!(kick, bucket = current, fingerprint = %in_hand, "Relocating evicted fingerprint");

        if table.bucket_mut(current).try_insert(in_hand).is_some() {
            return Placement::Relocated { kicks: kick };
        }
    }

    for (bucket, slot, previous) in journal.into_iter().rev() {
        table.bucket_mut(bucket).replace(slot, Some(previous));
    }
    Placement::Exhausted
}

/// A cuckoo filter over integer keys.
///
/// Each key is reduced to a one-byte fingerprint stored in one of two
/// candidate buckets. Lookups and deletes act on fingerprints alone, so two
/// keys sharing a fingerprint and a bucket are indistinguishable: lookups may
/// report false positives and a delete may clear the other key's slot. An
/// exact registry of inserted keys rejects duplicate inserts and is replayed
/// whenever the table doubles.
///
/// The relocation RNG is a type parameter so eviction sequences can be made
/// deterministic.
///
/// # Examples
///
/// ```
/// use kolea_lib::data_structures::kolea_cuckoo_filter::{KoleaCuckooFilter, KoleaCuckooFilterConfig};
///
/// let config = KoleaCuckooFilterConfig::new().with_seed(42);
/// let mut filter = KoleaCuckooFilter::with_config(config).unwrap();
///
/// assert!(filter.insert(5).unwrap());
/// assert!(!filter.insert(5).unwrap());
/// assert!(filter.lookup(5));
/// assert!(filter.delete(5));
/// assert!(!filter.delete(5));
/// ```
pub struct KoleaCuckooFilter<R = StdRng> {
    /// Construction parameters
    config: KoleaCuckooFilterConfig,

    /// Index derivation for the current table size
    hasher: KoleaHasher,

    /// Current bucket table, replaced wholesale on resize
    table: Table,

    /// Exact record of live keys
    keys: KeyRegistry,

    /// Source of relocation victims
    rng: R,

    /// Report sinks
    observers: Vec<Box<dyn FilterObserver>>,
}

impl KoleaCuckooFilter<StdRng> {
    /// Create a filter with the default configuration (16 buckets of 4 slots, 500 kicks).
    pub fn new() -> Self {
        let config = KoleaCuckooFilterConfig::default();
        let rng = StdRng::from_os_rng();
        Self::build(config, rng)
    }

    /// Create a filter with the given configuration.
    ///
    /// The RNG is seeded from `config.seed()` when set, otherwise from the OS.
    pub fn with_config(config: KoleaCuckooFilterConfig) -> Result<Self> {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl Default for KoleaCuckooFilter<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> KoleaCuckooFilter<R> {
    /// Create a filter that draws relocation victims from `rng`.
    pub fn with_rng(config: KoleaCuckooFilterConfig, rng: R) -> Result<Self> {
        config.validate()?;
        if !config.bucket_count().is_power_of_two() {
            warn!(
                bucket_count = config.bucket_count(),
                "Bucket count is not a power of two; relocated fingerprints may leave their candidate buckets"
            );
        }
        Ok(Self::build(config, rng))
    }

    fn build(config: KoleaCuckooFilterConfig, rng: R) -> Self {
        Self {
            hasher: KoleaHasher::new(config.bucket_count()),
            table: Table::new(config.bucket_count(), config.bucket_size()),
            keys: KeyRegistry::new(),
            rng,
            observers: Vec::new(),
            config,
        }
    }

    /// Register an observer that receives a report after every operation.
    pub fn add_observer(&mut self, observer: Box<dyn FilterObserver>) {
        self.observers.push(observer);
    }

    /// Builder-style variant of [`add_observer`](Self::add_observer).
    pub fn with_observer(mut self, observer: Box<dyn FilterObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    /// Insert a key.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the key was stored
    /// * `Ok(false)` if the key was already live (the table is untouched)
    /// * `Err(ResizeLimitExceeded)` if relocation still failed after
    ///   `max_resizes` doublings; every previously live key remains stored
    pub fn insert(&mut self, key: Key) -> Result<bool> {
        if self.keys.contains(key) {
            debug!(key, "Rejecting duplicate key");
            self.emit(
                OperationKind::Insert,
                Some(key),
                false,
                format!("Duplicate key {key} not inserted"),
                Vec::new(),
                None,
                None,
            );
            return Ok(false);
        }

        let mut resizes_left = self.config.max_resizes();
        loop {
            let candidates = self.hasher.candidates(key);
            let placement = place(
                &mut self.table,
                &self.hasher,
                &mut self.rng,
                self.config.max_kicks(),
                &candidates,
            );

            let description = match placement {
                Placement::Direct => format!(
                    "Inserted {key} with hash1: {}, hash2: {}, fingerprint: {}",
                    candidates.primary, candidates.secondary, candidates.fingerprint
                ),
                Placement::Relocated { kicks } => format!(
                    "Inserted {key} after {kicks} {} with hash1: {}, hash2: {}, fingerprint: {}",
                    if kicks == 1 { "kick" } else { "kicks" },
                    candidates.primary, candidates.secondary, candidates.fingerprint
                ),
                Placement::Exhausted => {
                    debug!(key, max_kicks = self.config.max_kicks(), "Relocation exhausted, resizing");
                    if let Err(e) = self.grow(key, &mut resizes_left) {
                        warn!(key, error = %e, "Insert abandoned");
                        self.emit(
                            OperationKind::Insert,
                            Some(key),
                            false,
                            format!("Failed to insert {key}: {e}"),
                            candidates.touched(),
                            Some(candidates.fingerprint),
                            None,
                        );
                        return Err(e);
                    }
                    continue;
                }
            };

            self.keys.insert(key);
            debug!(
                key,
                primary = candidates.primary,
                secondary = candidates.secondary,
                fingerprint = %candidates.fingerprint,
                "Inserted key"
            );
            self.emit(
                OperationKind::Insert,
                Some(key),
                true,
                description,
                candidates.touched(),
                Some(candidates.fingerprint),
                Some(HighlightIntent::Touched),
            );
            return Ok(true);
        }
    }

    /// Check whether a key's fingerprint is in one of its candidate buckets.
    ///
    /// False positives are possible; false negatives are not for live keys.
    /// Never mutates the table.
    pub fn lookup(&mut self, key: Key) -> bool {
        let candidates = self.hasher.candidates(key);
        let found = self.contains(key);
        debug!(key, found, "Lookup");

        let (description, intent) = if found {
            ("Found", HighlightIntent::Confirmed)
        } else {
            ("Not found", HighlightIntent::NotFound)
        };
        self.emit(
            OperationKind::Lookup,
            Some(key),
            found,
            format!(
                "{description} {key} with hash1: {}, hash2: {}, fingerprint: {}",
                candidates.primary, candidates.secondary, candidates.fingerprint
            ),
            candidates.touched(),
            Some(candidates.fingerprint),
            Some(intent),
        );
        found
    }

    /// Membership test without emitting a report.
    pub fn contains(&self, key: Key) -> bool {
        let candidates = self.hasher.candidates(key);
        self.table.buckets()[candidates.primary].contains(candidates.fingerprint)
            || self.table.buckets()[candidates.secondary].contains(candidates.fingerprint)
    }

    /// Delete a key by clearing one matching fingerprint from its candidate buckets.
    ///
    /// Returns `false` (leaving the table unchanged) when neither bucket holds
    /// the fingerprint.
    pub fn delete(&mut self, key: Key) -> bool {
        let candidates = self.hasher.candidates(key);
        let cleared = [candidates.primary, candidates.secondary]
            .into_iter()
            .find(|&index| self.table.bucket_mut(index).remove(candidates.fingerprint).is_some());

        let description = format!(
            "hash1: {}, hash2: {}, fingerprint: {}",
            candidates.primary, candidates.secondary, candidates.fingerprint
        );
        match cleared {
            Some(bucket) => {
                self.keys.remove(key);
                debug!(key, bucket, "Deleted key");
                self.emit(
                    OperationKind::Delete,
                    Some(key),
                    true,
                    format!("Deleted {key} with {description}"),
                    vec![bucket],
                    Some(candidates.fingerprint),
                    None,
                );
                true
            }
            None => {
                debug!(key, "Delete found no matching fingerprint");
                self.emit(
                    OperationKind::Delete,
                    Some(key),
                    false,
                    format!("Not found for deletion {key} with {description}"),
                    Vec::new(),
                    Some(candidates.fingerprint),
                    None,
                );
                false
            }
        }
    }

    /// Double the table until every live key can be replayed into it.
    ///
    /// The new table is built off to the side and swapped in only when
    /// complete. Each doubling consumes one unit of `resizes_left`.
    fn grow(&mut self, key: Key, resizes_left: &mut usize) -> Result<()> {
        let old_count = self.table.bucket_count();
        let mut new_count = old_count;
        loop {
            let bucket_size = self.config.bucket_size();
            let doubled = new_count.checked_mul(2).filter(|&count| {
                *resizes_left > 0
                    && count
                        .checked_mul(bucket_size)
                        .is_some_and(|slots| slots <= MAX_TABLE_SLOTS)
            });
            new_count = match doubled {
                Some(count) => count,
                None => {
                    return Err(KoleaCuckooFilterError::ResizeLimitExceeded {
                        key,
                        resizes: self.config.max_resizes() - *resizes_left,
                        bucket_count: self.table.bucket_count(),
                    })
                }
            };
            *resizes_left -= 1;

            let hasher = KoleaHasher::new(new_count);
            let mut table = Table::new(new_count, self.config.bucket_size());
            let max_kicks = self.config.max_kicks();
            let rng = &mut self.rng;
            let replayed = self.keys.as_slice().iter().all(|&live| {
                place(&mut table, &hasher, rng, max_kicks, &hasher.candidates(live)) != Placement::Exhausted
            });

            if replayed {
                self.table = table;
                self.hasher = hasher;
                info!(old_count, new_count, keys = self.keys.len(), "Rehash complete");
                self.emit(
                    OperationKind::Rehash,
                    None,
                    true,
                    format!("Rehash complete: {old_count} -> {new_count} buckets"),
                    Vec::new(),
                    None,
                    None,
                );
                return Ok(());
            }
            debug!(bucket_count = new_count, "Replay did not fit, doubling again");
        }
    }

    /// Current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Slots per bucket.
    pub fn bucket_size(&self) -> usize {
        self.table.bucket_size()
    }

    /// Nominal fingerprint width.
    pub fn fingerprint_bits(&self) -> u32 {
        self.config.fingerprint_bits()
    }

    /// Relocation budget.
    pub fn max_kicks(&self) -> usize {
        self.config.max_kicks()
    }

    /// Construction parameters.
    pub fn config(&self) -> &KoleaCuckooFilterConfig {
        &self.config
    }

    /// All buckets in index order.
    pub fn buckets(&self) -> &[Bucket] {
        self.table.buckets()
    }

    /// The bucket at `index`, if in range.
    pub fn bucket(&self, index: usize) -> Option<&Bucket> {
        self.table.bucket(index)
    }

    /// Live keys in insertion order.
    pub fn live_keys(&self) -> &[Key] {
        self.keys.as_slice()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key is live.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Fraction of slots occupied.
    pub fn load_factor(&self) -> f64 {
        self.table.occupied() as f64 / self.table.capacity() as f64
    }

    /// Fingerprint and candidate buckets a key maps to in the current table.
    pub fn candidates(&self, key: Key) -> CandidateBuckets {
        self.hasher.candidates(key)
    }

    /// Parameters and bucket contents as they are now.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(&self.table, self.config.fingerprint_bits(), self.config.max_kicks())
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &mut self,
        operation: OperationKind,
        key: Option<Key>,
        success: bool,
        description: String,
        touched_buckets: Vec<usize>,
        fingerprint: Option<Fingerprint>,
        highlight: Option<HighlightIntent>,
    ) {
        if self.observers.is_empty() {
            return;
        }
        let report = OperationReport {
            operation,
            key,
            success,
            description,
            touched_buckets,
            fingerprint,
            highlight,
            live_keys: self.keys.as_slice().to_vec(),
            snapshot: self.snapshot(),
        };
        for observer in &mut self.observers {
            observer.on_operation(&report);
        }
    }
}

impl<R> fmt::Debug for KoleaCuckooFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KoleaCuckooFilter")
            .field("config", &self.config)
            .field("bucket_count", &self.table.bucket_count())
            .field("live_keys", &self.keys.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::kolea_cuckoo_filter::report::{MockFilterObserver, RecordingObserver};

    fn single_slot_filter(max_resizes: usize) -> KoleaCuckooFilter {
        let config = KoleaCuckooFilterConfig::new()
            .with_bucket_count(16)
            .with_bucket_size(1)
            .with_max_kicks(10)
            .with_max_resizes(max_resizes)
            .with_seed(1);
        KoleaCuckooFilter::with_config(config).unwrap()
    }

    #[test]
    fn test_cuckoo_filter_basic() {
        let mut filter = KoleaCuckooFilter::new();

        assert!(filter.insert(10).unwrap());
        assert!(filter.insert(20).unwrap());

        assert!(filter.lookup(10));
        assert!(filter.lookup(20));
        assert_eq!(filter.live_keys(), &[10, 20]);
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_duplicate_insert_leaves_table_alone() {
        let mut filter = KoleaCuckooFilter::new();
        filter.insert(7).unwrap();
        let before = filter.snapshot();

        assert!(!filter.insert(7).unwrap());
        assert_eq!(filter.snapshot(), before);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_relocation_moves_evicted_fingerprint() {
        let recorder = RecordingObserver::new();
        let mut filter = single_slot_filter(0).with_observer(Box::new(recorder.clone()));

        // keys 1 and 41 share primary bucket 12; 41 overflows into bucket 0
        assert!(filter.insert(1).unwrap());
        assert!(filter.insert(41).unwrap());
        assert!(filter.delete(1));

        // key 5 lives in bucket 0 only, so 41's fingerprint is kicked back to 12
        assert!(filter.insert(5).unwrap());
        let report = recorder.last().unwrap();
        assert!(report.description.contains("after 1 kick with"), "{}", report.description);

        assert_eq!(filter.bucket(0).unwrap().slots(), &[Some(Fingerprint::new(208))]);
        assert_eq!(filter.bucket(12).unwrap().slots(), &[Some(Fingerprint::new(108))]);
        assert!(filter.lookup(41));
        assert!(filter.lookup(5));
        assert!(!filter.lookup(1));
    }

    #[test]
    fn test_exhausted_relocation_resizes() {
        let recorder = RecordingObserver::new();
        let mut filter = single_slot_filter(16).with_observer(Box::new(recorder.clone()));

        assert!(filter.insert(5).unwrap());
        assert!(filter.insert(21).unwrap());

        assert_eq!(filter.bucket_count(), 32);
        assert!(filter.lookup(5));
        assert!(filter.lookup(21));

        let operations: Vec<OperationKind> = recorder.reports().iter().map(|r| r.operation).collect();
        assert_eq!(
            &operations[..3],
            &[OperationKind::Insert, OperationKind::Rehash, OperationKind::Insert]
        );
        assert_eq!(recorder.reports()[1].snapshot.bucket_count, 32);
    }

    #[test]
    fn test_resize_limit_keeps_existing_keys() {
        let mut filter = single_slot_filter(0);
        filter.insert(5).unwrap();
        let before = filter.snapshot();

        let err = filter.insert(21).unwrap_err();
        assert_eq!(
            err,
            KoleaCuckooFilterError::ResizeLimitExceeded {
                key: 21,
                resizes: 0,
                bucket_count: 16,
            }
        );
        assert_eq!(filter.snapshot(), before);
        assert_eq!(filter.live_keys(), &[5]);
        assert!(filter.lookup(5));
    }

    #[test]
    fn test_resize_limit_reports_live_bucket_count() {
        let config = KoleaCuckooFilterConfig::new()
            .with_bucket_count(3)
            .with_bucket_size(1)
            .with_max_kicks(0)
            .with_max_resizes(1)
            .with_seed(4);
        let mut filter = KoleaCuckooFilter::with_config(config).unwrap();
        for key in [-93, 27, 63] {
            assert!(filter.insert(key).unwrap());
        }
        let before = filter.snapshot();

        // 27 and 63 both map only to bucket 4 of a 6-bucket table, so the replay fails
        let err = filter.insert(-100).unwrap_err();
        assert_eq!(
            err,
            KoleaCuckooFilterError::ResizeLimitExceeded {
                key: -100,
                resizes: 1,
                bucket_count: 3,
            }
        );
        assert_eq!(filter.bucket_count(), 3);
        assert_eq!(filter.snapshot(), before);
    }

    #[test]
    fn test_zero_kicks_goes_straight_to_resize() {
        let config = KoleaCuckooFilterConfig::new()
            .with_bucket_count(16)
            .with_bucket_size(1)
            .with_max_kicks(0)
            .with_seed(3);
        let mut filter = KoleaCuckooFilter::with_config(config).unwrap();

        filter.insert(5).unwrap();
        filter.insert(21).unwrap();
        assert_eq!(filter.bucket_count(), 32);
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let mut filter = KoleaCuckooFilter::new();
        filter.insert(1).unwrap();
        filter.insert(2).unwrap();
        let before = filter.snapshot();

        assert!(!filter.delete(99));
        assert_eq!(filter.snapshot(), before);
        assert_eq!(filter.live_keys(), &[1, 2]);
    }

    #[test]
    fn test_shared_fingerprint_aliases() {
        let mut filter = KoleaCuckooFilter::new();
        filter.insert(3).unwrap();

        // -1 mixes to the negation of 3, so it is a guaranteed false positive
        assert!(filter.lookup(-1));
        assert!(filter.delete(-1));
        assert!(!filter.lookup(3));
        assert_eq!(filter.live_keys(), &[3]);
    }

    #[test]
    fn test_zero_fingerprint_is_not_matched_by_empty_slots() {
        let mut filter = KoleaCuckooFilter::new();
        assert_eq!(filter.candidates(-4971).fingerprint, Fingerprint::new(0));
        assert!(!filter.lookup(-4971));
        assert!(filter.insert(-4971).unwrap());
        assert!(filter.lookup(-4971));
    }

    #[test]
    fn test_lookup_reports_intent() {
        let recorder = RecordingObserver::new();
        let mut filter = KoleaCuckooFilter::new().with_observer(Box::new(recorder.clone()));
        filter.insert(5).unwrap();

        filter.lookup(5);
        let hit = recorder.last().unwrap();
        assert_eq!(hit.highlight, Some(HighlightIntent::Confirmed));
        assert_eq!(hit.touched_buckets, vec![0]);
        assert_eq!(hit.fingerprint, Some(Fingerprint::new(208)));

        filter.lookup(1);
        let miss = recorder.last().unwrap();
        assert_eq!(miss.highlight, Some(HighlightIntent::NotFound));
        assert_eq!(miss.touched_buckets, vec![12, 0]);
        assert_eq!(miss.live_keys, vec![5]);
    }

    #[test]
    fn test_observer_called_per_operation() {
        let mut observer = MockFilterObserver::new();
        observer.expect_on_operation().times(4).returning(|_| ());

        let mut filter = KoleaCuckooFilter::new().with_observer(Box::new(observer));
        filter.insert(5).unwrap();
        filter.insert(5).unwrap();
        filter.lookup(5);
        filter.delete(5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = KoleaCuckooFilterConfig::new().with_bucket_size(0);
        assert!(matches!(
            KoleaCuckooFilter::with_config(config),
            Err(KoleaCuckooFilterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_oversized_config_is_an_error_not_a_panic() {
        let config = KoleaCuckooFilterConfig::new()
            .with_bucket_count(1)
            .with_bucket_size(usize::MAX);
        let built = std::panic::catch_unwind(|| KoleaCuckooFilter::with_config(config));
        assert!(matches!(
            built,
            Ok(Err(KoleaCuckooFilterError::InvalidConfiguration(_)))
        ));
    }

    #[test]
    fn test_load_factor() {
        let mut filter = KoleaCuckooFilter::new();
        assert_eq!(filter.load_factor(), 0.0);
        for key in 0..8 {
            filter.insert(key).unwrap();
        }
        assert_eq!(filter.load_factor(), 8.0 / 64.0);
    }
}
