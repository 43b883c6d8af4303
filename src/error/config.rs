//! Configuration error module.
//!
//! This module defines error types that may occur while loading, parsing and
//! validating Kolea configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::data_structures::KoleaCuckooFilterError;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error when the configuration file is missing.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Error when the configuration file has an extension we cannot parse.
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Error when parsing the configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Error when validating the configuration.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// The filter section describes a filter that cannot be built.
    #[error("Invalid filter settings: {0}")]
    InvalidFilter(#[from] KoleaCuckooFilterError),
}
