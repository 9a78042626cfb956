//! Object Handles and Raw Addresses
//!
//! `Obj` is the collector-tracked view of a heap object, `Addr` the untracked
//! one. Converting between them is the runtime's object-tracking primitive:
//!
//! ```text
//!   Obj ── to_untracked() ──▶ Addr      (valid until the next safepoint)
//!   Addr ── from_untracked() ──▶ Obj    (unsafe: caller vouches for the object)
//! ```
//!
//! The collector may move the object behind an `Obj` at any safepoint, so an
//! `Addr` obtained from a handle must not be held across one.

use std::fmt;

/// Untyped machine word naming a byte in the address space.
pub type Addr = usize;

/// Byte distance from an object's header to one of its slots.
pub type Off = usize;

/// Collector-tracked reference to a heap object, or null.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Obj {
    raw: Addr,
}

impl Obj {
    /// The null object.
    pub const NULL: Obj = Obj { raw: 0 };

    /// Start tracking the object at `address`.
    ///
    /// # Safety
    ///
    /// `address` must be null or the header address of a live heap object,
    /// and the call must happen before the next safepoint after `address`
    /// was obtained.
    #[inline(always)]
    pub const unsafe fn from_untracked(address: Addr) -> Self {
        Self { raw: address }
    }

    /// Absolute address of the object, no longer tracked by the collector.
    #[inline(always)]
    pub const fn to_untracked(self) -> Addr {
        self.raw
    }

    #[inline(always)]
    pub const fn is_null(self) -> bool {
        self.raw == 0
    }

    /// Address of the slot `off` bytes past the object's header.
    #[inline(always)]
    pub const fn field_address(self, off: Off) -> Addr {
        self.raw.wrapping_add(off)
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Obj(null)")
        } else {
            write!(f, "Obj({:#x})", self.raw)
        }
    }
}
