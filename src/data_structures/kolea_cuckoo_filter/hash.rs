// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Fingerprint and bucket index derivation for the Kolea Cuckoo Filter.
//!
//! Keys are mixed once with the MurmurHash2 multiplier using wrapping 32-bit
//! arithmetic. The magnitude of the mixed value selects the primary bucket and
//! its lowest byte becomes the fingerprint. The alternate bucket depends only on
//! the fingerprint and the bucket it currently sits in (partial-key cuckoo
//! hashing), so relocation never needs the original key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer key type accepted by the filter.
pub type Key = i32;

/// MurmurHash2 multiplier used to mix keys.
#[allow(clippy::unreadable_literal)]
pub const MIX_CONSTANT: i32 = 0x5bd1e995;

/// A one-byte fingerprint stored in a bucket slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u8);

impl Fingerprint {
    /// Wrap a raw fingerprint byte.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// The raw fingerprint byte.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Mix a key: `(key ^ C) * C` with 32-bit wraparound.
pub fn mix(key: Key) -> i32 {
    (key ^ MIX_CONSTANT).wrapping_mul(MIX_CONSTANT)
}

/// Derive the fingerprint of a key.
///
/// This is the first little-endian byte of `|mix(key)|`. `i32::MIN` has the
/// magnitude `2^31`.
pub fn fingerprint(key: Key) -> Fingerprint {
    Fingerprint(mix(key).unsigned_abs().to_le_bytes()[0])
}

/// Primary bucket of a key: `|mix(key)| mod bucket_count`.
pub fn primary_index(key: Key, bucket_count: usize) -> usize {
    mix(key).unsigned_abs() as usize % bucket_count
}

/// Alternate bucket for a fingerprint sitting in `index`: `(index ^ fp) mod bucket_count`.
///
/// The mapping is an involution when `bucket_count` is a power of two.
pub fn alternate_index(fingerprint: Fingerprint, index: usize, bucket_count: usize) -> usize {
    (index ^ usize::from(fingerprint.value())) % bucket_count
}

/// The fingerprint of a key together with both buckets it may live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBuckets {
    /// Fingerprint stored for the key
    pub fingerprint: Fingerprint,
    /// Bucket derived from the key itself
    pub primary: usize,
    /// Bucket derived from the fingerprint and the primary bucket
    pub secondary: usize,
}

impl CandidateBuckets {
    /// Both buckets, with the secondary dropped when it equals the primary.
    pub fn touched(&self) -> Vec<usize> {
        if self.primary == self.secondary {
            vec![self.primary]
        } else {
            vec![self.primary, self.secondary]
        }
    }
}

/// Bucket index derivation bound to the current table size.
#[derive(Debug, Clone)]
pub struct KoleaHasher {
    bucket_count: usize,
}

impl KoleaHasher {
    /// Creates a hasher for a table of `bucket_count` buckets.
    pub fn new(bucket_count: usize) -> Self {
        Self { bucket_count }
    }

    /// Gets the fingerprint and both candidate buckets for a key.
    pub fn candidates(&self, key: Key) -> CandidateBuckets {
        let fingerprint = fingerprint(key);
        let primary = primary_index(key, self.bucket_count);
        CandidateBuckets {
            fingerprint,
            primary,
            secondary: alternate_index(fingerprint, primary, self.bucket_count),
        }
    }

    /// Gets the bucket a fingerprint moves to when evicted from `index`.
    pub fn alternate(&self, fingerprint: Fingerprint, index: usize) -> usize {
        alternate_index(fingerprint, index, self.bucket_count)
    }

    /// The table size this hasher reduces indices to.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 678_072_505; "zero")]
    #[test_case(1, -862_410_972; "one")]
    #[test_case(5, 1_565_589_712; "five")]
    #[test_case(i32::MIN, -1_469_411_143; "minimum")]
    fn test_mix_wraps(key: Key, expected: i32) {
        assert_eq!(mix(key), expected);
    }

    #[test_case(5, 0, 208; "five")]
    #[test_case(1, 12, 220; "one")]
    #[test_case(0, 9, 185; "zero")]
    #[test_case(17, 4, 212; "seventeen")]
    fn test_primary_and_fingerprint(key: Key, primary: usize, fp: u8) {
        assert_eq!(primary_index(key, 16), primary);
        assert_eq!(fingerprint(key), Fingerprint::new(fp));
    }

    #[test]
    fn test_secondary_matches_formula() {
        let hasher = KoleaHasher::new(16);
        let c = hasher.candidates(5);
        let expected = (primary_index(5, 16) ^ usize::from(fingerprint(5).value())) % 16;
        assert_eq!(c.secondary, expected);
    }

    #[test]
    fn test_alternate_is_involution_for_power_of_two() {
        let hasher = KoleaHasher::new(64);
        for key in -500..500 {
            let c = hasher.candidates(key);
            assert_eq!(hasher.alternate(c.fingerprint, c.secondary), c.primary);
        }
    }

    #[test]
    fn test_sign_flipped_mix_collides() {
        // mix(3) == -mix(-1), so both keys share fingerprint and buckets
        let hasher = KoleaHasher::new(16);
        assert_eq!(mix(3), -mix(-1));
        assert_eq!(hasher.candidates(3), hasher.candidates(-1));
    }

    #[test]
    fn test_touched_deduplicates() {
        let c = CandidateBuckets {
            fingerprint: Fingerprint::new(16),
            primary: 0,
            secondary: 0,
        };
        assert_eq!(c.touched(), vec![0]);
    }
}
