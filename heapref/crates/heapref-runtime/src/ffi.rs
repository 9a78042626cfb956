//! Accessor FFI - C-compatible entry points over the process accessor
//!
//! Objects cross the boundary as untracked addresses (`*mut c_void`), slots
//! as raw addresses (`usize`). The compressed slot encoding itself is part
//! of the ABI: code on the other side may load and store compressed slots
//! directly as long as it follows `heapref_heap_base` and
//! `heapref_reference_shift`.

use std::ffi::c_void;
use std::sync::atomic::{AtomicPtr, Ordering};

use heapref::runtime::init::is_initialized;
use heapref::{
    install_write_barrier, Addr, Obj, Off, RefConfig, RuntimeInitializer, REFERENCE_ACCESS,
};

/// C write barrier hook: `(holder, offset, stored value)`.
pub type CBarrierFn = extern "C" fn(obj: *mut c_void, off: usize, value: *mut c_void);

static C_BARRIER: AtomicPtr<()> = AtomicPtr::new(std::ptr::null_mut());

/// Process barrier hook forwarding to the installed C hook.
fn forward_to_c_barrier(obj: Obj, off: Off, value: Obj) {
    let hook = C_BARRIER.load(Ordering::Relaxed);
    if !hook.is_null() {
        // SAFETY: only ever stored from a `CBarrierFn`.
        let hook: CBarrierFn = unsafe { std::mem::transmute::<*mut (), CBarrierFn>(hook) };
        hook(
            obj.to_untracked() as *mut c_void,
            off,
            value.to_untracked() as *mut c_void,
        );
    }
}

/// # Safety
///
/// `address` must be null or a live object address.
#[inline(always)]
unsafe fn object(address: *mut c_void) -> Obj {
    Obj::from_untracked(address as Addr)
}

/// Bring up the process accessor from the `HEAPREF_*` environment.
///
/// Returns false if the environment describes an encoding other than the
/// one this library was built with.
#[no_mangle]
pub extern "C" fn heapref_init() -> bool {
    if is_initialized() {
        return true;
    }

    match RuntimeInitializer::new(RefConfig::from_env()).initialize() {
        Ok(_) => true,
        Err(e) => {
            log::error!("failed to bring up heap reference access: {}", e);
            false
        },
    }
}

#[no_mangle]
pub extern "C" fn heapref_compressed_enabled() -> bool {
    REFERENCE_ACCESS.compressed_enabled()
}

#[no_mangle]
pub extern "C" fn heapref_heap_base() -> usize {
    REFERENCE_ACCESS.policy().base()
}

#[no_mangle]
pub extern "C" fn heapref_reference_shift() -> u8 {
    REFERENCE_ACCESS.policy().shift()
}

/// Slot width in bytes for the given encoding.
#[no_mangle]
pub extern "C" fn heapref_reference_size(compressed: bool) -> usize {
    REFERENCE_ACCESS.policy().reference_size(compressed)
}

/// Install the process write barrier hook.
///
/// Returns false if `hook` is null or a hook is already installed.
///
/// # Safety
///
/// `hook` runs inside uninterruptible code: it must not allocate, lock,
/// block, yield, or reach a safepoint. Must be called before any thread
/// performs barriered stores.
#[no_mangle]
pub unsafe extern "C" fn heapref_install_write_barrier(hook: Option<CBarrierFn>) -> bool {
    let Some(hook) = hook else {
        log::warn!("refusing to install a null write barrier hook");
        return false;
    };

    if C_BARRIER
        .compare_exchange(
            std::ptr::null_mut(),
            hook as *mut (),
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_err()
    {
        log::warn!("a C write barrier hook is already installed");
        return false;
    }

    // SAFETY: the forwarder only calls `hook`, which the caller vouched for.
    match install_write_barrier(forward_to_c_barrier) {
        Ok(()) => true,
        Err(e) => {
            C_BARRIER.store(std::ptr::null_mut(), Ordering::Release);
            log::error!("failed to install write barrier hook: {}", e);
            false
        },
    }
}

/// Read the object reference in the slot at `p`.
///
/// # Safety
///
/// `p` must be a valid, aligned slot of the indicated encoding.
#[no_mangle]
pub unsafe extern "C" fn heapref_read_object_at(p: usize, compressed: bool) -> *mut c_void {
    REFERENCE_ACCESS.read_object_at(p, compressed).to_untracked() as *mut c_void
}

/// Read the slot at `p` as an untracked address.
///
/// # Safety
///
/// As for `heapref_read_object_at`; the result must not be held across a
/// safepoint.
#[no_mangle]
pub unsafe extern "C" fn heapref_read_object_as_untracked(p: usize, compressed: bool) -> usize {
    REFERENCE_ACCESS.read_object_as_untracked(p, compressed)
}

/// Store `value` into the slot at `p` without a write barrier.
///
/// # Safety
///
/// `p` must be a valid, aligned, writable slot of the indicated encoding.
#[no_mangle]
pub unsafe extern "C" fn heapref_write_object_at(p: usize, value: *mut c_void, compressed: bool) {
    REFERENCE_ACCESS.write_object_at(p, object(value), compressed)
}

/// Store `value` into field `off` of `obj`, then run the write barrier.
///
/// # Safety
///
/// `obj` must be a live object with a reference slot at `off` in the heap
/// encoding.
#[no_mangle]
pub unsafe extern "C" fn heapref_write_object_barriered(
    obj: *mut c_void,
    off: usize,
    value: *mut c_void,
    compressed: bool,
) {
    REFERENCE_ACCESS.write_object_barriered(object(obj), off, object(value), compressed)
}
