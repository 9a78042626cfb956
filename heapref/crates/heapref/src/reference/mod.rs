//! Reference Module - Compressed and Uncompressed Reference Access
//!
//! Heap slots hold either full-width absolute addresses or 32-bit compressed
//! references decoded relative to the heap base:
//!
//! ```text
//! Uncompressed slot (8 bytes on 64-bit):
//! ┌──────────────────────────────────────────────┐
//! │              absolute address A              │
//! └──────────────────────────────────────────────┘
//!
//! Compressed slot (4 bytes):
//! ┌──────────────────────┐
//! │  (A - base) >> shift │      0 = null
//! └──────────────────────┘
//! ```
//!
//! - `encoding`: the bit-exact encode/decode law
//! - `policy`: whether compression is on, and with which base and shift
//! - `slot`: type-level slot encodings for monomorphized access
//! - `access`: the accessor every object-valued slot read and write goes through

pub mod access;
pub mod encoding;
pub mod policy;
pub mod slot;

pub use access::ReferenceAccess;
pub use encoding::{CompressEncoding, MAX_REFERENCE_SHIFT};
pub use policy::{compressed_enabled, EncodingPolicy};
pub use slot::{Compressed, SlotEncoding, Uncompressed};
