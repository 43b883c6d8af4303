// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Configuration for the Kolea Cuckoo Filter.

use crate::data_structures::kolea_cuckoo_filter::error::{KoleaCuckooFilterError, Result};

/// Largest nominal fingerprint width accepted by the filter.
pub const MAX_FINGERPRINT_BITS: u32 = 32;

/// Largest number of slots (`bucket_count * bucket_size`) a table may hold,
/// including tables produced by resizing.
pub const MAX_TABLE_SLOTS: usize = 1 << 28;

/// Configuration for the Kolea Cuckoo Filter.
///
/// `bucket_count` is only the initial table size: the filter doubles it
/// whenever relocation runs out of kicks. `fingerprint_bits` is carried for
/// reporting; every slot stores exactly one fingerprint byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KoleaCuckooFilterConfig {
    /// Initial number of buckets
    bucket_count: usize,

    /// Slots per bucket, fixed for the lifetime of the filter
    bucket_size: usize,

    /// Nominal fingerprint width in bits
    fingerprint_bits: u32,

    /// Relocation attempts before a resize is triggered
    max_kicks: usize,

    /// Table doublings allowed within a single insert
    max_resizes: usize,

    /// Seed for the relocation RNG; `None` seeds from the OS
    seed: Option<u64>,
}

impl KoleaCuckooFilterConfig {
    /// Create a new default configuration.
    ///
    /// Default values:
    /// - bucket_count: 16
    /// - bucket_size: 4
    /// - fingerprint_bits: 4
    /// - max_kicks: 500
    /// - max_resizes: 16
    /// - seed: None
    pub fn new() -> Self {
        Self {
            bucket_count: 16,
            bucket_size: 4,
            fingerprint_bits: 4,
            max_kicks: 500,
            max_resizes: 16,
            seed: None,
        }
    }

    /// Set the initial number of buckets.
    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Set the number of fingerprint slots per bucket.
    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Set the nominal fingerprint width in bits.
    pub fn with_fingerprint_bits(mut self, fingerprint_bits: u32) -> Self {
        self.fingerprint_bits = fingerprint_bits;
        self
    }

    /// Set the number of relocation attempts made before resizing.
    pub fn with_max_kicks(mut self, max_kicks: usize) -> Self {
        self.max_kicks = max_kicks;
        self
    }

    /// Set how many times a single insert may double the table.
    pub fn with_max_resizes(mut self, max_resizes: usize) -> Self {
        self.max_resizes = max_resizes;
        self
    }

    /// Seed the relocation RNG so eviction sequences are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the configuration describes a usable filter.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(KoleaCuckooFilterError::InvalidConfiguration(
                "bucket_count must be greater than 0".to_string(),
            ));
        }
        if self.bucket_size == 0 {
            return Err(KoleaCuckooFilterError::InvalidConfiguration(
                "bucket_size must be greater than 0".to_string(),
            ));
        }
        match self.bucket_count.checked_mul(self.bucket_size) {
            Some(slots) if slots <= MAX_TABLE_SLOTS => {}
            _ => {
                return Err(KoleaCuckooFilterError::InvalidConfiguration(format!(
                    "bucket_count * bucket_size must not exceed {MAX_TABLE_SLOTS} slots, got {} * {}",
                    self.bucket_count, self.bucket_size
                )))
            }
        }
        if self.fingerprint_bits == 0 || self.fingerprint_bits > MAX_FINGERPRINT_BITS {
            return Err(KoleaCuckooFilterError::InvalidConfiguration(format!(
                "fingerprint_bits must be between 1 and {MAX_FINGERPRINT_BITS}, got {}",
                self.fingerprint_bits
            )));
        }
        Ok(())
    }

    /// Get the initial number of buckets
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Get the number of slots per bucket
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Get the nominal fingerprint width
    pub fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    /// Get the relocation budget
    pub fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    /// Get the per-insert resize budget
    pub fn max_resizes(&self) -> usize {
        self.max_resizes
    }

    /// Get the RNG seed, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for KoleaCuckooFilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
