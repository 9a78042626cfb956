//! Barrier Hooks - the post-write side of barriered stores
//!
//! Everything here runs inside uninterruptible code, so this module holds
//! only the trait, the barriers the accessor dispatches to and the process
//! hook slot. Installation and its logging live in the parent module.

use std::fmt;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::object::{Obj, Off};

/// Signature of a write barrier hook: `(holder, offset, stored value)`.
pub type BarrierFn = fn(Obj, Off, Obj);

/// Post-write hook invoked by barriered reference stores.
///
/// # Safety
///
/// `post_write` runs on the mutator thread inside uninterruptible code. It
/// must not allocate, acquire locks, block, yield, or contain a safepoint,
/// and it must not call back into anything that might.
pub unsafe trait WriteBarrier {
    fn post_write(&self, obj: Obj, off: Off, value: Obj);
}

unsafe impl<B: WriteBarrier + ?Sized> WriteBarrier for &B {
    #[inline(always)]
    fn post_write(&self, obj: Obj, off: Off, value: Obj) {
        (**self).post_write(obj, off, value)
    }
}

/// Barrier for collectors without post-write work.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWriteBarrier;

unsafe impl WriteBarrier for NoWriteBarrier {
    #[inline(always)]
    fn post_write(&self, _obj: Obj, _off: Off, _value: Obj) {}
}

/// Barrier that calls a fixed function.
#[derive(Clone, Copy)]
pub struct HookBarrier {
    hook: BarrierFn,
}

impl HookBarrier {
    /// # Safety
    ///
    /// `hook` must honor the `WriteBarrier` contract.
    pub const unsafe fn new(hook: BarrierFn) -> Self {
        Self { hook }
    }
}

impl fmt::Debug for HookBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookBarrier({:p})", self.hook as *const ())
    }
}

unsafe impl WriteBarrier for HookBarrier {
    #[inline(always)]
    fn post_write(&self, obj: Obj, off: Off, value: Obj) {
        (self.hook)(obj, off, value)
    }
}

/// Process hook. Null until `install_write_barrier` runs.
pub(crate) static WRITE_BARRIER_HOOK: AtomicPtr<()> = AtomicPtr::new(std::ptr::null_mut());

/// Barrier dispatching to the process hook.
///
/// The hook is written once during bring-up, before any mutator thread
/// exists, so the hot path reads it with a relaxed load. Until a hook is
/// installed it behaves like `NoWriteBarrier`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalBarrier;

unsafe impl WriteBarrier for GlobalBarrier {
    #[inline(always)]
    fn post_write(&self, obj: Obj, off: Off, value: Obj) {
        let hook = WRITE_BARRIER_HOOK.load(Ordering::Relaxed);
        if !hook.is_null() {
            // SAFETY: only ever stored from a `BarrierFn` in `install_write_barrier`.
            let hook: BarrierFn = unsafe { std::mem::transmute::<*mut (), BarrierFn>(hook) };
            hook(obj, off, value);
        }
    }
}
