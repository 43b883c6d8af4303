//! Cuckoo filter configuration module.
//!
//! Serializable counterpart of [`KoleaCuckooFilterConfig`] so filter parameters
//! can come from configuration files and environment variables.

use super::{ConfigResult, Validate};
use crate::data_structures::KoleaCuckooFilterConfig;
use serde::{Deserialize, Serialize};

/// Filter parameters as they appear in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterSettings {
    /// Initial number of buckets (doubled on resize)
    pub bucket_count: usize,

    /// Fingerprint slots per bucket
    pub bucket_size: usize,

    /// Nominal fingerprint width in bits
    pub fingerprint_bits: u32,

    /// Relocation attempts before a resize
    pub max_kicks: usize,

    /// Table doublings allowed within one insert
    pub max_resizes: usize,

    /// Seed for reproducible relocation; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        let defaults = KoleaCuckooFilterConfig::default();
        Self {
            bucket_count: defaults.bucket_count(),
            bucket_size: defaults.bucket_size(),
            fingerprint_bits: defaults.fingerprint_bits(),
            max_kicks: defaults.max_kicks(),
            max_resizes: defaults.max_resizes(),
            seed: defaults.seed(),
        }
    }
}

impl FilterSettings {
    /// Builds the engine configuration.
    pub fn to_filter_config(&self) -> KoleaCuckooFilterConfig {
        let config = KoleaCuckooFilterConfig::new()
            .with_bucket_count(self.bucket_count)
            .with_bucket_size(self.bucket_size)
            .with_fingerprint_bits(self.fingerprint_bits)
            .with_max_kicks(self.max_kicks)
            .with_max_resizes(self.max_resizes);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

impl Validate for FilterSettings {
    fn validate(&self) -> ConfigResult<()> {
        self.to_filter_config().validate()?;
        Ok(())
    }
}
