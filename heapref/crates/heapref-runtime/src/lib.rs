//! heapref Runtime Library
//!
//! C ABI over the process-wide reference accessor, for compiler backends
//! and foreign runtimes that share the heap:
//! - bring-up and policy queries
//! - write barrier hook installation
//! - the four accessor operations on raw addresses

mod ffi;

pub use ffi::*;
