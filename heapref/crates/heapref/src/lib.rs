//! # heapref - Typed Heap Reference Accessor
//!
//! heapref is the bottleneck through which every read and write of an
//! object-valued slot in a managed heap flows. It distinguishes between
//! uncompressed references (full machine-word absolute addresses) and
//! compressed references (32-bit values decoded relative to a heap base),
//! and routes heap-interior stores through the collector's write barrier.
//!
//! ## Overview
//!
//! - **Encoding policy**: whether heap-interior slots are compressed, and the
//!   base and shift used to decode them. Fixed at build time.
//! - **Reference accessor**: reads and writes slots at raw addresses or at
//!   object + offset, optionally invoking the write barrier.
//! - **Write barrier seam**: the collector plugs its post-write hook in here.
//!
//! ## Quick Start
//!
//! ```rust
//! use heapref::{Obj, RefConfig};
//!
//! fn main() -> heapref::Result<()> {
//!     // Bring-up, before any mutator thread exists
//!     let access = heapref::init_with_config(RefConfig::default())?;
//!
//!     // A root slot holding a full-width reference
//!     let mut root: usize = 0;
//!     let slot = &mut root as *mut usize as usize;
//!     let handle = unsafe { Obj::from_untracked(0x2000) };
//!
//!     unsafe {
//!         access.write_object_at(slot, handle, false);
//!         assert_eq!(access.read_object_at(slot, false), handle);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Compressed Reference Encoding
//!
//! ```text
//! encode(A) = (A == 0) ? 0 : (A - base) >> shift
//! decode(c) = (c == 0) ? 0 : base + (c << shift)
//! ```
//!
//! This law is shared with compiler-generated code that loads and stores
//! compressed slots directly, so it is part of the ABI.
//!
//! ## Build-Time Knobs
//!
//! | Cargo feature            | Effect                                          |
//! |--------------------------|-------------------------------------------------|
//! | `compressed-references`  | heap-interior slots are 32-bit                  |
//! | `heap-base-shift`        | base `0x8_0000_0000`, shift 3 (else 0 / 0)      |
//!
//! ## Uninterruptible Contract
//!
//! Accessor operations may be called where safepoints, allocation and
//! blocking are forbidden. They never allocate, lock, yield, or reach a
//! safepoint, and the write barrier they call is held to the same rules by
//! the `unsafe trait WriteBarrier`.
//!
//! ## Safety
//!
//! Reads and writes are plain loads and stores of the slot. Passing an
//! invalid address is undefined behavior, so every operation is an
//! `unsafe fn`. Handles (`Obj`) may be moved by the collector at any
//! safepoint; untracked addresses must not be held across one.
//!
//! ## Modules
//!
//! - [`barrier`]: write barrier trait, hooks and statistics
//! - [`config`]: runtime view of the encoding knobs
//! - [`error`]: bring-up error types
//! - [`logging`]: bring-up event log
//! - [`object`]: object handles and raw addresses
//! - [`reference`]: encoding law, policy and the accessor
//! - [`runtime`]: the process-wide accessor and its bring-up

// Accessor core
pub mod object;
pub mod reference;
pub mod barrier;

// Bring-up
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use barrier::{
    install_write_barrier, BarrierFn, CountingBarrier, GlobalBarrier, HookBarrier,
    NoWriteBarrier, WriteBarrier,
};
pub use config::{ConfigError, RefConfig};
pub use error::{RefError, Result};
pub use object::{Addr, Obj, Off};
pub use reference::{
    compressed_enabled, CompressEncoding, Compressed, EncodingPolicy, ReferenceAccess,
    SlotEncoding, Uncompressed,
};
pub use runtime::{reference_access, RuntimeInitializer, REFERENCE_ACCESS};

/// heapref version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bring up the process accessor with the default configuration
///
/// Returns the process-wide accessor.
///
/// ```rust
/// let access = heapref::init()?;
/// assert_eq!(access.compressed_enabled(), heapref::compressed_enabled());
/// # Ok::<(), heapref::RefError>(())
/// ```
pub fn init() -> Result<&'static ReferenceAccess<GlobalBarrier>> {
    RuntimeInitializer::new(RefConfig::default()).initialize()
}

/// Bring up the process accessor with a custom configuration
///
/// Fails with `RefError::PolicyMismatch` if `config` describes an encoding
/// other than the one this build was compiled with.
pub fn init_with_config(config: RefConfig) -> Result<&'static ReferenceAccess<GlobalBarrier>> {
    RuntimeInitializer::new(config).initialize()
}
