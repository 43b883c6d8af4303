// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Kolea Cuckoo Filter for approximate membership of integer keys.
//!
//! A cuckoo filter stores a one-byte fingerprint of each key in one of two
//! candidate buckets. When both buckets are full, a random fingerprint is
//! kicked out of the primary bucket and moved to its own alternate bucket,
//! repeating for up to `max_kicks` evictions. If that budget runs out the
//! table doubles and every live key is replayed into it.
//!
//! # Features
//!
//! - Partial-key cuckoo hashing: the alternate bucket is derived from the
//!   fingerprint, so relocation never needs the original key.
//! - Bounded relocation with rollback, and bounded doubling per insert.
//! - Exact duplicate rejection through a registry of live keys.
//! - Injectable RNG for reproducible eviction sequences.
//! - Observer interface receiving a report after every operation.
//!
//! # Example
//!
//! ```
//! use kolea_lib::data_structures::kolea_cuckoo_filter::{
//!     KoleaCuckooFilter, KoleaCuckooFilterConfig, RecordingObserver,
//! };
//!
//! let recorder = RecordingObserver::new();
//! let config = KoleaCuckooFilterConfig::new()
//!     .with_bucket_count(16)
//!     .with_bucket_size(4)
//!     .with_fingerprint_bits(4)
//!     .with_max_kicks(500);
//! let mut filter = KoleaCuckooFilter::with_config(config)
//!     .unwrap()
//!     .with_observer(Box::new(recorder.clone()));
//!
//! for key in 1..=17 {
//!     assert!(filter.insert(key).unwrap());
//! }
//! assert!((1..=17).all(|key| filter.lookup(key)));
//! assert!(!filter.insert(1).unwrap());
//!
//! let last = recorder.last().unwrap();
//! assert_eq!(last.live_keys.len(), 17);
//! ```
//!
//! # Approximation
//!
//! Lookup and delete only see fingerprints. A key that was never inserted
//! can be reported present, and deleting it clears whichever live key owns
//! the matching fingerprint. Duplicate detection on insert is exact.

// Module declarations
mod bucket;
mod config;
mod error;
mod filter;
mod hash;
mod registry;
mod report;

// Re-exports
pub use bucket::{Bucket, Slot};
pub use config::{KoleaCuckooFilterConfig, MAX_FINGERPRINT_BITS, MAX_TABLE_SLOTS};
pub use error::{KoleaCuckooFilterError, Result};
pub use filter::KoleaCuckooFilter;
pub use hash::{
    alternate_index, fingerprint, mix, primary_index, CandidateBuckets, Fingerprint, Key,
    KoleaHasher, MIX_CONSTANT,
};
pub use report::{
    FilterObserver, HighlightIntent, JsonLinesObserver, OperationKind, OperationReport,
    RecordingObserver, TableSnapshot, TracingObserver,
};
