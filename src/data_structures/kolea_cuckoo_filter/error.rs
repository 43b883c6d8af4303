// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the Kolea Cuckoo Filter.

use crate::data_structures::kolea_cuckoo_filter::hash::Key;

/// Errors that can occur in Kolea Cuckoo Filter operations.
///
/// Duplicate inserts and missing keys are ordinary outcomes and are reported
/// through return values, not through this type.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum KoleaCuckooFilterError {
    /// The filter has an invalid configuration
    #[error("Invalid filter configuration: {0}")]
    InvalidConfiguration(String),

    /// Relocation kept failing after the allowed number of table doublings,
    /// or the next doubling would exceed `MAX_TABLE_SLOTS`
    #[error(
        "Key {key} could not be placed after {resizes} {} (bucket count {bucket_count})",
        if *resizes == 1 { "resize" } else { "resizes" }
    )]
    ResizeLimitExceeded {
        /// The key that could not be placed
        key: Key,
        /// Number of doublings attempted during the insert
        resizes: usize,
        /// Bucket count of the live table, which the failed insert left in place
        bucket_count: usize,
    },
}

/// Result type for Kolea Cuckoo Filter operations
pub type Result<T> = std::result::Result<T, KoleaCuckooFilterError>;
