//! Data structures for Kolea.
//!
//! This module contains the approximate-membership structures at the core of
//! the crate. All implementations adhere to the project requirements:
//! - No unsafe code
//! - Bounded work per operation
//! - Observable through reports rather than tied to any presentation

pub mod kolea_cuckoo_filter;

// Re-export common data structures
pub use kolea_cuckoo_filter::{
    KoleaCuckooFilter, KoleaCuckooFilterConfig, KoleaCuckooFilterError, OperationReport,
};
