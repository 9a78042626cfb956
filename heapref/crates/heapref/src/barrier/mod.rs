//! Barrier Module - Write Barrier Seam
//!
//! Every barriered reference store ends in `WriteBarrier::post_write` with
//! the holder object, the slot offset and the stored value. What the barrier
//! does with them (card marking, remembered-set insertion, SATB logging) is
//! the collector's business; the accessor only guarantees it is called
//! exactly once per barriered store and never for unbarriered ones.
//!
//! Barriers run inside uninterruptible code. Implementing the trait is
//! therefore `unsafe`: the implementor promises the hook never allocates,
//! takes a lock, parks, yields, or reaches a safepoint.
//!
//! Provided barriers:
//! - `NoWriteBarrier` - collectors that need no post-write work
//! - `HookBarrier` - a plain function pointer fixed at construction
//! - `GlobalBarrier` - the process hook, installed once during bring-up
//! - `CountingBarrier` - counts invocations and forwards to another barrier

pub mod counting;
pub mod hook;
pub mod stats;

pub use counting::CountingBarrier;
pub use hook::{BarrierFn, GlobalBarrier, HookBarrier, NoWriteBarrier, WriteBarrier};
pub use stats::{AtomicWriteBarrierStats, WriteBarrierStats};

use std::sync::atomic::Ordering;

use crate::error::{RefError, Result};
use crate::logging::{log_event, RefEvent};
use hook::WRITE_BARRIER_HOOK;

/// Install the process write barrier hook.
///
/// Must run during bring-up, before any thread that performs barriered
/// stores is started. The hook cannot be replaced afterwards.
///
/// # Safety
///
/// `hook` must honor the `WriteBarrier` contract.
pub unsafe fn install_write_barrier(hook: BarrierFn) -> Result<()> {
    let installed = WRITE_BARRIER_HOOK.compare_exchange(
        std::ptr::null_mut(),
        hook as *mut (),
        Ordering::AcqRel,
        Ordering::Acquire,
    );
    match installed {
        Ok(_) => {
            log::info!("write barrier hook installed at {:p}", hook as *const ());
            log_event(RefEvent::BarrierInstalled {
                hook: hook as usize,
            });
            Ok(())
        },
        Err(current) => {
            log::warn!(
                "write barrier hook already installed at {:p}, ignoring {:p}",
                current,
                hook as *const ()
            );
            Err(RefError::BarrierAlreadyInstalled)
        },
    }
}

/// Whether a process write barrier hook has been installed.
pub fn write_barrier_installed() -> bool {
    !WRITE_BARRIER_HOOK.load(Ordering::Acquire).is_null()
}
