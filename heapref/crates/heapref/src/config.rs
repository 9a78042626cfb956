//! Configuration Module - Reference Encoding Knobs
//!
//! The process singleton's encoding is fixed at build time (see
//! `reference::policy`). `RefConfig` describes the same knobs at runtime so
//! bring-up can verify the embedding runtime agrees with the build, and so
//! tools can construct accessors for other encodings.

use serde::{Deserialize, Serialize};

use crate::object::Addr;
use crate::reference::policy::{
    EncodingPolicy, HEAP_BASE, REFERENCE_SHIFT, USE_COMPRESSED_REFERENCES,
};

/// Main configuration for the reference accessor
///
/// # Examples
///
/// ```rust
/// use heapref::RefConfig;
///
/// // Whatever this build was compiled with
/// let config = RefConfig::default();
/// assert!(config.validate().is_ok());
///
/// // Compressed references with a 32 GiB heap at 32 GiB
/// let config = RefConfig {
///     use_compressed_references: true,
///     heap_base: 0x8_0000_0000,
///     reference_shift: 3,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefConfig {
    /// Heap-interior reference slots are 32-bit compressed references
    ///
    /// Default: the `compressed-references` cargo feature
    pub use_compressed_references: bool,

    /// Base address compressed references are decoded against
    ///
    /// Must be aligned to `1 << reference_shift`, and zero when compression
    /// is disabled.
    /// Default: 0, or 32 GiB with the `heap-base-shift` feature
    pub heap_base: Addr,

    /// Left shift applied when decoding compressed references
    ///
    /// Equals log2 of the object alignment. Must be at most
    /// `MAX_REFERENCE_SHIFT`.
    /// Default: 0, or 3 with the `heap-base-shift` feature
    pub reference_shift: u8,

    /// Print bring-up events to the console
    ///
    /// Default: false
    pub verbose: bool,
}

impl Default for RefConfig {
    fn default() -> Self {
        RefConfig {
            use_compressed_references: USE_COMPRESSED_REFERENCES,
            heap_base: if USE_COMPRESSED_REFERENCES { HEAP_BASE } else { 0 },
            reference_shift: if USE_COMPRESSED_REFERENCES { REFERENCE_SHIFT } else { 0 },
            verbose: false,
        }
    }
}

impl RefConfig {
    /// Validate configuration
    ///
    /// ```rust
    /// use heapref::RefConfig;
    ///
    /// let config = RefConfig {
    ///     use_compressed_references: true,
    ///     reference_shift: 9, // Invalid!
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.use_compressed_references && (self.heap_base != 0 || self.reference_shift != 0) {
            return Err(ConfigError::BaseWithoutCompression {
                base: self.heap_base,
                shift: self.reference_shift,
            });
        }

        self.policy().validate()
    }

    /// Encoding policy described by this configuration
    pub fn policy(&self) -> EncodingPolicy {
        if self.use_compressed_references {
            EncodingPolicy::compressed(self.heap_base, self.reference_shift)
        } else {
            EncodingPolicy::uncompressed()
        }
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - HEAPREF_COMPRESSED
    /// - HEAPREF_HEAP_BASE (decimal or 0x-prefixed hex)
    /// - HEAPREF_REFERENCE_SHIFT
    /// - HEAPREF_VERBOSE
    ///
    /// Unparsable values are ignored.
    ///
    /// ```bash
    /// export HEAPREF_COMPRESSED=1
    /// export HEAPREF_HEAP_BASE=0x800000000
    /// export HEAPREF_REFERENCE_SHIFT=3
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HEAPREF_COMPRESSED") {
            if let Some(flag) = parse_flag(&val) {
                config.use_compressed_references = flag;
            }
        }

        if let Ok(val) = std::env::var("HEAPREF_HEAP_BASE") {
            if let Some(base) = parse_address(&val) {
                config.heap_base = base;
            }
        }

        if let Ok(val) = std::env::var("HEAPREF_REFERENCE_SHIFT") {
            if let Ok(shift) = val.trim().parse::<u8>() {
                config.reference_shift = shift;
            }
        }

        if let Ok(val) = std::env::var("HEAPREF_VERBOSE") {
            config.verbose = parse_flag(&val).unwrap_or(false);
        }

        config
    }
}

/// Error types for configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid reference shift: {0} (maximum is 4)")]
    InvalidShift(u8),

    #[error("Heap base {base:#x} is not aligned to the reference shift {shift}")]
    MisalignedBase { base: Addr, shift: u8 },

    #[error("Heap base {base:#x} / shift {shift} given but compressed references are disabled")]
    BaseWithoutCompression { base: Addr, shift: u8 },
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim() {
        "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_address(val: &str) -> Option<Addr> {
    let val = val.trim().replace('_', "");
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => Addr::from_str_radix(hex, 16).ok(),
        None => val.parse::<Addr>().ok(),
    }
}
