//! Process Accessor Tests
//!
//! The write barrier hook can be installed once per process, so the whole
//! bring-up sequence lives in a single test of its own binary.

mod common;

use common::{fake_object, TestObject};
use heapref::barrier::write_barrier_installed;
use heapref::runtime::init::is_initialized;
use heapref::{
    compressed_enabled, install_write_barrier, EncodingPolicy, Obj, Off, RefConfig, RefError,
    RuntimeInitializer, REFERENCE_ACCESS,
};
use std::sync::atomic::{AtomicUsize, Ordering};

static CALLS: AtomicUsize = AtomicUsize::new(0);
static LAST_OBJ: AtomicUsize = AtomicUsize::new(0);
static LAST_OFF: AtomicUsize = AtomicUsize::new(0);
static LAST_VALUE: AtomicUsize = AtomicUsize::new(0);

fn remember_store(obj: Obj, off: Off, value: Obj) {
    LAST_OBJ.store(obj.to_untracked(), Ordering::Relaxed);
    LAST_OFF.store(off, Ordering::Relaxed);
    LAST_VALUE.store(value.to_untracked(), Ordering::Relaxed);
    CALLS.fetch_add(1, Ordering::Relaxed);
}

fn other_hook(_obj: Obj, _off: Off, _value: Obj) {}

/// **Invariant verified:** the process accessor uses the compiled-in policy,
/// its barrier is a no-op until bring-up installs the hook, and the hook
/// cannot be replaced afterwards.
#[test]
fn test_process_accessor_bring_up() {
    let policy = EncodingPolicy::BUILD;
    let compressed = compressed_enabled();
    let width = policy.heap_reference_size();
    assert_eq!(*REFERENCE_ACCESS.policy(), policy);
    assert_eq!(REFERENCE_ACCESS.compressed_enabled(), compressed);

    let mut object = TestObject::new();
    let obj = object.handle();
    let value = fake_object(&policy, 3);

    // Before bring-up the process barrier does nothing
    assert!(!write_barrier_installed());
    unsafe {
        REFERENCE_ACCESS.write_object_barriered(obj, 0, value, compressed);
    }
    assert_eq!(CALLS.load(Ordering::Relaxed), 0);
    assert_eq!(
        unsafe { REFERENCE_ACCESS.read_object_at(obj.field_address(0), compressed) },
        value
    );

    let access = unsafe {
        RuntimeInitializer::new(RefConfig::default()).with_write_barrier(remember_store)
    }
    .initialize()
    .expect("default configuration matches the build");
    assert!(std::ptr::eq(access, &REFERENCE_ACCESS));
    assert!(write_barrier_installed());
    assert!(is_initialized());

    let off = 2 * width;
    unsafe {
        access.write_object_barriered(obj, off, value, compressed);
    }
    assert_eq!(CALLS.load(Ordering::Relaxed), 1);
    assert_eq!(LAST_OBJ.load(Ordering::Relaxed), obj.to_untracked());
    assert_eq!(LAST_OFF.load(Ordering::Relaxed), off);
    assert_eq!(LAST_VALUE.load(Ordering::Relaxed), value.to_untracked());

    // Unbarriered stores still bypass the installed hook
    unsafe {
        access.write_object_at(obj.field_address(width), Obj::NULL, compressed);
    }
    assert_eq!(CALLS.load(Ordering::Relaxed), 1);

    let second = unsafe { install_write_barrier(other_hook) };
    assert!(matches!(second, Err(RefError::BarrierAlreadyInstalled)));

    // Running bring-up again without a hook is allowed
    assert!(heapref::init().is_ok());

    unsafe {
        access.write_object_barriered(obj, off, Obj::NULL, compressed);
    }
    assert_eq!(CALLS.load(Ordering::Relaxed), 2, "original hook must stay in place");
}
