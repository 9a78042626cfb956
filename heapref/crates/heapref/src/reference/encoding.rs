//! Compressed Reference Encoding
//!
//! A compressed reference is a 32-bit value decoded relative to the heap
//! base:
//!
//! ```text
//! encode(A) = (A == 0) ? 0 : (A - base) >> shift
//! decode(c) = (c == 0) ? 0 : base + (c << shift)
//! ```
//!
//! This law is the ABI shared with compiler-generated loads and stores of
//! compressed slots, so it must stay bit-exact.
//!
//! With `base == 0` the null case falls out of the arithmetic and both
//! directions are branch-free; the explicit null test is only emitted for a
//! non-zero base.

use serde::{Deserialize, Serialize};

use crate::object::Addr;

/// Largest supported reference shift (16-byte object alignment, 64 GiB heap).
pub const MAX_REFERENCE_SHIFT: u8 = 4;

/// Base and shift of the compressed reference encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompressEncoding {
    base: Addr,
    shift: u8,
}

impl CompressEncoding {
    /// Compressed value reserved for the null object.
    pub const NULL: u32 = 0;

    /// Plain 32-bit narrowing: `base = 0`, `shift = 0`.
    pub const NARROW: Self = Self::new(0, 0);

    pub const fn new(base: Addr, shift: u8) -> Self {
        Self { base, shift }
    }

    #[inline(always)]
    pub const fn base(&self) -> Addr {
        self.base
    }

    #[inline(always)]
    pub const fn shift(&self) -> u8 {
        self.shift
    }

    /// Alignment every non-null encoded address must have.
    ///
    /// Zero when the shift is too wide for an address, in which case no
    /// non-null address is representable.
    #[inline(always)]
    pub const fn alignment(&self) -> usize {
        match 1usize.checked_shl(self.shift as u32) {
            Some(alignment) => alignment,
            None => 0,
        }
    }

    /// Highest absolute address a compressed reference can name.
    pub const fn max_address(&self) -> Addr {
        self.base
            .wrapping_add((u32::MAX as usize).wrapping_shl(self.shift as u32))
    }

    /// Encode an absolute address.
    ///
    /// The address must be null or representable; anything else is a caller
    /// bug and trips a debug assertion.
    #[inline(always)]
    pub fn encode(&self, address: Addr) -> u32 {
        debug_assert!(
            self.is_representable(address),
            "address {:#x} is not representable as a compressed reference",
            address
        );
        if self.base == 0 {
            return (address >> self.shift) as u32;
        }
        if address == 0 {
            return Self::NULL;
        }
        (address.wrapping_sub(self.base) >> self.shift) as u32
    }

    /// Decode a compressed value into an absolute address.
    #[inline(always)]
    pub fn decode(&self, compressed: u32) -> Addr {
        if self.base == 0 {
            return (compressed as usize) << self.shift;
        }
        if compressed == Self::NULL {
            return 0;
        }
        self.base.wrapping_add((compressed as usize) << self.shift)
    }

    /// Checked encoding for diagnostics and tooling.
    pub fn try_encode(&self, address: Addr) -> Option<u32> {
        if self.is_representable(address) {
            Some(self.encode(address))
        } else {
            None
        }
    }

    /// Whether `address` has a compressed form that decodes back to it.
    ///
    /// Null is always representable. The base itself is not: its encoding
    /// would collide with null, so the first granule above the base is the
    /// lowest usable object address.
    pub fn is_representable(&self, address: Addr) -> bool {
        if address == 0 {
            return true;
        }
        let alignment = self.alignment();
        if alignment == 0 || address <= self.base {
            return false;
        }
        let delta = address - self.base;
        if delta & (alignment - 1) != 0 {
            return false;
        }
        (delta >> self.shift) <= u32::MAX as usize
    }
}

impl Default for CompressEncoding {
    fn default() -> Self {
        Self::NARROW
    }
}
