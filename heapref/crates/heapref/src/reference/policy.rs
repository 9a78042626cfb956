//! Encoding Policy - Compressed Reference Knobs
//!
//! The policy decides whether heap-interior slots hold compressed references
//! and, if so, which base and shift decode them. The process-wide policy is
//! fixed at build time through cargo features:
//!
//! | Feature                  | Effect                                           |
//! |--------------------------|--------------------------------------------------|
//! | `compressed-references`  | heap-interior slots are 32-bit                   |
//! | `heap-base-shift`        | decode relative to `HEAP_BASE` with shift 3      |
//!
//! Because `EncodingPolicy::BUILD` is a constant, `compressed_enabled()` folds
//! at every call site that goes through the process singleton.

use std::fmt;
use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{RefError, Result};
use crate::object::Addr;
use crate::reference::encoding::{CompressEncoding, MAX_REFERENCE_SHIFT};

/// Whether heap-interior slots are compressed in this build.
pub const USE_COMPRESSED_REFERENCES: bool = cfg!(feature = "compressed-references");

/// Heap base of this build (zero unless `heap-base-shift` is enabled).
pub const HEAP_BASE: Addr = if cfg!(all(feature = "heap-base-shift", target_pointer_width = "64")) {
    0x8_0000_0000u64 as Addr
} else {
    0
};

/// Reference shift of this build (zero unless `heap-base-shift` is enabled).
pub const REFERENCE_SHIFT: u8 = if cfg!(feature = "heap-base-shift") { 3 } else { 0 };

/// Width in bytes of a compressed slot.
pub const COMPRESSED_REFERENCE_SIZE: usize = size_of::<u32>();

/// Width in bytes of an uncompressed slot.
pub const UNCOMPRESSED_REFERENCE_SIZE: usize = size_of::<Addr>();

/// Immutable encoding parameters `(enabled, base, shift)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodingPolicy {
    enabled: bool,
    encoding: CompressEncoding,
}

impl EncodingPolicy {
    /// Policy compiled into this build.
    pub const BUILD: Self = if USE_COMPRESSED_REFERENCES {
        Self::compressed(HEAP_BASE, REFERENCE_SHIFT)
    } else {
        Self::uncompressed()
    };

    /// Every slot holds a full machine word.
    pub const fn uncompressed() -> Self {
        Self {
            enabled: false,
            encoding: CompressEncoding::NARROW,
        }
    }

    /// Heap-interior slots hold 32-bit references decoded with `base` and `shift`.
    pub const fn compressed(base: Addr, shift: u8) -> Self {
        Self {
            enabled: true,
            encoding: CompressEncoding::new(base, shift),
        }
    }

    #[inline(always)]
    pub const fn compressed_enabled(&self) -> bool {
        self.enabled
    }

    /// Heap base. Only meaningful when compression is enabled.
    #[inline(always)]
    pub const fn base(&self) -> Addr {
        self.encoding.base()
    }

    /// Reference shift. Only meaningful when compression is enabled.
    #[inline(always)]
    pub const fn shift(&self) -> u8 {
        self.encoding.shift()
    }

    #[inline(always)]
    pub const fn encoding(&self) -> CompressEncoding {
        self.encoding
    }

    /// Width of a slot with the given encoding.
    #[inline(always)]
    pub const fn reference_size(&self, compressed: bool) -> usize {
        if compressed {
            COMPRESSED_REFERENCE_SIZE
        } else {
            UNCOMPRESSED_REFERENCE_SIZE
        }
    }

    /// Width of a heap-interior slot.
    #[inline(always)]
    pub const fn heap_reference_size(&self) -> usize {
        self.reference_size(self.enabled)
    }

    /// Compressed form of `address`, for image builders and tools that lay
    /// out heap contents ahead of time.
    ///
    /// Unlike the accessor, which treats an unrepresentable address as a
    /// caller bug, this reports it as an error.
    pub fn encode_checked(&self, address: Addr) -> Result<u32> {
        if !self.enabled {
            return Err(RefError::InvalidArgument(
                "compressed references are disabled".to_string(),
            ));
        }
        self.encoding
            .try_encode(address)
            .ok_or(RefError::UnrepresentableAddress { address })
    }

    /// Check the parameters can describe a usable heap.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.shift() > MAX_REFERENCE_SHIFT {
            return Err(ConfigError::InvalidShift(self.shift()));
        }
        if self.base() & (self.encoding.alignment() - 1) != 0 {
            return Err(ConfigError::MisalignedBase {
                base: self.base(),
                shift: self.shift(),
            });
        }
        Ok(())
    }
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self::BUILD
    }
}

impl fmt::Display for EncodingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(
                f,
                "compressed(base={:#x}, shift={})",
                self.base(),
                self.shift()
            )
        } else {
            f.write_str("uncompressed")
        }
    }
}

/// Whether this build compresses heap-interior references.
#[inline(always)]
pub const fn compressed_enabled() -> bool {
    EncodingPolicy::BUILD.compressed_enabled()
}
