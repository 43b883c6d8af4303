//! Test modules for Kolea.
//!
//! Crate-level suites that cut across modules:
//! - Configuration loading from files and environment variables
//! - Error types and the process-wide reporter
//! - Filter behaviour under property-based tests
//! - Script execution through the command runner

pub mod error_tests;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{
    key_strategy, keys_strategy, seeded_filter, small_config_strategy, TestFixture,
};
