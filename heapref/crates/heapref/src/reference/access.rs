//! Reference Accessor - Reads and Writes of Object-Valued Slots
//!
//! Every operation here may be called from uninterruptible code: nothing in
//! this module allocates, locks, logs, yields, or reaches a safepoint. Each
//! operation lowers to one plain load or store of the slot, plus at most an
//! add and a shift for compressed slots, plus the barrier call for barriered
//! stores.
//!
//! Two call styles are offered:
//!
//! ```text
//! read_object_at(p, compressed)        runtime flag, folds when constant
//! read_object_in::<Compressed>(p)      type-level, no flag at all
//! ```
//!
//! Preconditions are checked with debug assertions only. Passing an invalid
//! address is undefined behavior, exactly like a raw load or store.

use crate::barrier::WriteBarrier;
use crate::object::{Addr, Obj, Off};
use crate::reference::policy::EncodingPolicy;
use crate::reference::slot::{Compressed, SlotEncoding, Uncompressed};

/// Accessor for reference slots under one encoding policy.
///
/// The process-wide instance is `crate::runtime::REFERENCE_ACCESS`; other
/// instances exist for tools and tests that need a different policy or
/// barrier.
#[derive(Debug)]
pub struct ReferenceAccess<B = crate::barrier::GlobalBarrier> {
    policy: EncodingPolicy,
    barrier: B,
}

impl<B: WriteBarrier> ReferenceAccess<B> {
    pub const fn new(policy: EncodingPolicy, barrier: B) -> Self {
        Self { policy, barrier }
    }

    #[inline(always)]
    pub const fn policy(&self) -> &EncodingPolicy {
        &self.policy
    }

    #[inline(always)]
    pub const fn barrier(&self) -> &B {
        &self.barrier
    }

    /// Whether heap-interior slots are compressed.
    #[inline(always)]
    pub const fn compressed_enabled(&self) -> bool {
        self.policy.compressed_enabled()
    }

    /// Read the object reference at `p` and return a tracked handle.
    ///
    /// The handle is valid until the next safepoint.
    ///
    /// # Safety
    ///
    /// `p` must be a valid, aligned slot of the indicated encoding holding
    /// null or a reference to a live object.
    #[inline(always)]
    pub unsafe fn read_object_at(&self, p: Addr, compressed: bool) -> Obj {
        if compressed {
            self.read_object_in::<Compressed>(p)
        } else {
            self.read_object_in::<Uncompressed>(p)
        }
    }

    /// Read the object reference at `p` and return its absolute address,
    /// untracked by the collector.
    ///
    /// # Safety
    ///
    /// As for `read_object_at`. In addition the caller must not hold the
    /// result across a safepoint.
    #[inline(always)]
    pub unsafe fn read_object_as_untracked(&self, p: Addr, compressed: bool) -> Addr {
        if compressed {
            self.read_object_as_untracked_in::<Compressed>(p)
        } else {
            self.read_object_as_untracked_in::<Uncompressed>(p)
        }
    }

    /// Store `value` into the slot at `p` without a write barrier.
    ///
    /// For root, stack and thread-local slots, and for collector fix-ups
    /// where a barrier would be wrong or redundant.
    ///
    /// # Safety
    ///
    /// `p` must be a valid, aligned, writable slot of the indicated encoding.
    #[inline(always)]
    pub unsafe fn write_object_at(&self, p: Addr, value: Obj, compressed: bool) {
        if compressed {
            self.write_object_in::<Compressed>(p, value)
        } else {
            self.write_object_in::<Uncompressed>(p, value)
        }
    }

    /// Store `value` into the field `off` bytes into `obj`, then run the
    /// write barrier with `(obj, off, value)`.
    ///
    /// `compressed` states the slot's encoding. Heap objects only contain
    /// references of the heap encoding, so it must equal
    /// `compressed_enabled()`.
    ///
    /// # Safety
    ///
    /// `obj` must be a live object with a reference slot at `off`.
    #[inline(always)]
    pub unsafe fn write_object_barriered(&self, obj: Obj, off: Off, value: Obj, compressed: bool) {
        if compressed {
            self.write_object_barriered_in::<Compressed>(obj, off, value)
        } else {
            self.write_object_barriered_in::<Uncompressed>(obj, off, value)
        }
    }

    /// Type-level form of `read_object_at`.
    ///
    /// # Safety
    ///
    /// As for `read_object_at`.
    #[inline(always)]
    pub unsafe fn read_object_in<E: SlotEncoding>(&self, p: Addr) -> Obj {
        Obj::from_untracked(self.read_object_as_untracked_in::<E>(p))
    }

    /// Type-level form of `read_object_as_untracked`.
    ///
    /// # Safety
    ///
    /// As for `read_object_as_untracked`.
    #[inline(always)]
    pub unsafe fn read_object_as_untracked_in<E: SlotEncoding>(&self, p: Addr) -> Addr {
        self.check_slot_encoding::<E>();
        E::decode(&self.policy.encoding(), E::load(p))
    }

    /// Type-level form of `write_object_at`.
    ///
    /// # Safety
    ///
    /// As for `write_object_at`.
    #[inline(always)]
    pub unsafe fn write_object_in<E: SlotEncoding>(&self, p: Addr, value: Obj) {
        self.check_slot_encoding::<E>();
        E::store(p, E::encode(&self.policy.encoding(), value.to_untracked()));
    }

    /// Type-level form of `write_object_barriered`.
    ///
    /// # Safety
    ///
    /// As for `write_object_barriered`.
    #[inline(always)]
    pub unsafe fn write_object_barriered_in<E: SlotEncoding>(
        &self,
        obj: Obj,
        off: Off,
        value: Obj,
    ) {
        debug_assert!(
            E::COMPRESSED == self.compressed_enabled(),
            "heap object must contain only references of the heap encoding (compressed={})",
            self.compressed_enabled()
        );
        self.write_object_in::<E>(obj.field_address(off), value);
        self.barrier.post_write(obj, off, value);
    }

    #[inline(always)]
    fn check_slot_encoding<E: SlotEncoding>(&self) {
        debug_assert!(
            !E::COMPRESSED || self.compressed_enabled(),
            "compressed slot accessed while compressed references are disabled"
        );
    }
}
