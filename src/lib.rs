//! Kolea Cuckoo Filter Library
//!
//! This library contains the core components of Kolea: a cuckoo filter over
//! 32-bit integer keys that reports every operation to pluggable observers,
//! together with layered configuration, error reporting and a small command
//! runner. The library backs the `kolea` binary but can also be used on its own.
//!
//! # Architecture
//!
//! - [`data_structures::kolea_cuckoo_filter`] holds the filter engine: hashing,
//!   buckets, relocation, resizing and operation reports
//! - [`config`] layers defaults, configuration files and `KOLEA__*` environment
//!   variables into a validated [`config::KoleaConfig`]
//! - [`runner`] parses command scripts and applies them to a filter
//! - [`error`] gathers the failure types and the process-wide error reporter

// Re-export public modules
pub mod config;
pub mod data_structures;
pub mod error;
pub mod runner;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for Kolea.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function.
///
/// Installs the tracing-backed error reporter. Returns `false` when a reporter
/// was already installed.
pub fn init() -> bool {
    error::set_error_reporter(std::sync::Arc::new(error::TracingErrorReporter))
}
