//! Object Module - Handles to collector-managed objects

pub mod handle;

pub use handle::{Addr, Obj, Off};
