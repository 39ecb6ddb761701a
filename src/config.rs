//! Bloom filter configuration and validation
//!
//! # Example
//!
//! ```
//! use spv_proof::config::FilterConfig;
//!
//! let config = FilterConfig::default()
//!     .with_size(10)
//!     .with_function_count(5)
//!     .with_tweak(99);
//! assert!(config.validate().is_ok());
//! ```

use crate::constants::*;
use crate::error::{Result, SpvError};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// Filter-load parameters
///
/// BIP37 bounds: at most 36,000 bytes of filter and 50 hash functions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Bit-array length in bytes
    pub size: usize,
    /// Number of seeded hash functions
    pub function_count: u32,
    /// Per-filter salt mixed into every seed
    pub tweak: u32,
    /// Update flag sent with the filter-load request
    pub update_flag: u8,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            size: 36,
            function_count: 5,
            tweak: 0,
            update_flag: BLOOM_UPDATE_ALL,
        }
    }
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(size: usize, function_count: u32, tweak: u32) -> Result<Self> {
        let config = Self {
            size,
            function_count,
            tweak,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// BIP37-optimal parameters for `elements` items at false positive rate
    /// `fp_rate`:
    /// - size = -n·ln(p) / (ln2² · 8) bytes
    /// - function_count = size·8 / n · ln2
    ///
    /// Both are clamped into the protocol bounds.
    pub fn for_elements(elements: usize, fp_rate: f64, tweak: u32) -> Result<Self> {
        if elements == 0 {
            return Err(SpvError::InvalidFilterParameters(
                "element count cannot be 0".to_string(),
            ));
        }
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(SpvError::InvalidFilterParameters(format!(
                "false positive rate {} must be in (0, 1)",
                fp_rate
            )));
        }

        let n = elements as f64;
        let size = (-1.0 / (LN_2 * LN_2) * n * fp_rate.ln() / 8.0) as usize;
        let size = size.clamp(1, MAX_BLOOM_FILTER_SIZE);
        let function_count = (size as f64 * 8.0 / n * LN_2) as u32;
        let function_count = function_count.clamp(1, MAX_HASH_FUNCS);

        Self::new(size, function_count, tweak)
    }

    /// Validate against BIP37 bounds
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size > MAX_BLOOM_FILTER_SIZE {
            return Err(SpvError::InvalidFilterParameters(format!(
                "size {} outside 1..={}",
                self.size, MAX_BLOOM_FILTER_SIZE
            )));
        }
        if self.function_count == 0 || self.function_count > MAX_HASH_FUNCS {
            return Err(SpvError::InvalidFilterParameters(format!(
                "function count {} outside 1..={}",
                self.function_count, MAX_HASH_FUNCS
            )));
        }
        if self.update_flag > BLOOM_UPDATE_P2PUBKEY_ONLY {
            return Err(SpvError::InvalidFilterParameters(format!(
                "unknown update flag {}",
                self.update_flag
            )));
        }
        Ok(())
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_function_count(mut self, function_count: u32) -> Self {
        self.function_count = function_count;
        self
    }

    pub fn with_tweak(mut self, tweak: u32) -> Self {
        self.tweak = tweak;
        self
    }

    pub fn with_update_flag(mut self, update_flag: u8) -> Self {
        self.update_flag = update_flag;
        self
    }
}
