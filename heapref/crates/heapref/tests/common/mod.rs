//! Test Utilities for the heapref Test Suite
//!
//! Objects here are plain, suitably aligned buffers standing in for heap
//! objects. Stored values are fabricated addresses that are never
//! dereferenced, so they can live anywhere the encoding can represent.

#![allow(dead_code)]

use heapref::{Addr, EncodingPolicy, NoWriteBarrier, Obj, Off, ReferenceAccess, WriteBarrier};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Heap base used by the based/shifted scenarios
pub const TEST_HEAP_BASE: Addr = 0x1_0000_0000;

/// Shift used by the based/shifted scenarios
pub const TEST_SHIFT: u8 = 3;

/// Fields per test object
pub const OBJECT_WORDS: usize = 8;

/// Encodings every property is exercised under
pub fn policies() -> [EncodingPolicy; 3] {
    [
        EncodingPolicy::uncompressed(),
        EncodingPolicy::compressed(0, 0),
        EncodingPolicy::compressed(TEST_HEAP_BASE, TEST_SHIFT),
    ]
}

/// Accessor with no barrier under `policy`
pub fn accessor(policy: EncodingPolicy) -> ReferenceAccess<NoWriteBarrier> {
    ReferenceAccess::new(policy, NoWriteBarrier)
}

/// Fabricated, representable object address for `policy`
pub fn fake_object(policy: &EncodingPolicy, index: usize) -> Obj {
    let granule = 1usize << policy.shift();
    let address = if policy.compressed_enabled() {
        policy.base() + (index + 1) * 16 * granule
    } else {
        0x10_0000 + index * 16
    };
    unsafe { Obj::from_untracked(address) }
}

/// Word-aligned stand-in for a heap object
#[repr(C, align(16))]
pub struct TestObject {
    pub words: [usize; OBJECT_WORDS],
}

impl TestObject {
    pub fn new() -> Box<Self> {
        Box::new(Self {
            words: [0; OBJECT_WORDS],
        })
    }

    pub fn handle(&mut self) -> Obj {
        unsafe { Obj::from_untracked(self.words.as_mut_ptr() as Addr) }
    }

    /// Raw 4-byte slot contents at `off`
    pub fn read_u32(&self, off: Off) -> u32 {
        unsafe { std::ptr::read((self.words.as_ptr() as *const u8).add(off) as *const u32) }
    }

    /// Raw word slot contents at `off`
    pub fn read_word(&self, off: Off) -> usize {
        unsafe { std::ptr::read((self.words.as_ptr() as *const u8).add(off) as *const usize) }
    }
}

/// Barrier that remembers its last invocation
///
/// Uses only relaxed atomics, so it honors the barrier contract.
#[derive(Debug, Default)]
pub struct RecordingBarrier {
    pub calls: AtomicUsize,
    pub last_obj: AtomicUsize,
    pub last_off: AtomicUsize,
    pub last_value: AtomicUsize,
}

impl RecordingBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Last `(obj, off, value)` seen
    pub fn last(&self) -> (Addr, Off, Addr) {
        (
            self.last_obj.load(Ordering::Relaxed),
            self.last_off.load(Ordering::Relaxed),
            self.last_value.load(Ordering::Relaxed),
        )
    }
}

unsafe impl WriteBarrier for RecordingBarrier {
    fn post_write(&self, obj: Obj, off: Off, value: Obj) {
        self.last_obj.store(obj.to_untracked(), Ordering::Relaxed);
        self.last_off.store(off, Ordering::Relaxed);
        self.last_value.store(value.to_untracked(), Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}
