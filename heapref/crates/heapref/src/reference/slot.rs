//! Slot Encodings - Type-Level Compressed/Uncompressed Markers
//!
//! A slot's encoding is a static property of where the slot lives, so it is
//! expressed as a type. Each accessor operation is monomorphized per marker
//! and contains no branch on the encoding.

use core::ptr;

use crate::object::Addr;
use crate::reference::encoding::CompressEncoding;

mod sealed {
    pub trait Sealed {}
}

/// Encoding of a reference slot.
pub trait SlotEncoding: sealed::Sealed + Copy + 'static {
    /// Whether slots of this kind hold compressed references.
    const COMPRESSED: bool;

    /// In-memory representation of one slot.
    type Word: Copy;

    /// Width of one slot in bytes.
    const WIDTH: usize = core::mem::size_of::<Self::Word>();

    fn encode(encoding: &CompressEncoding, address: Addr) -> Self::Word;

    fn decode(encoding: &CompressEncoding, word: Self::Word) -> Addr;

    /// Plain load of the slot at `p`.
    ///
    /// # Safety
    ///
    /// `p` must be valid for reads of `Self::WIDTH` bytes and aligned to it.
    #[inline(always)]
    unsafe fn load(p: Addr) -> Self::Word {
        ptr::read(p as *const Self::Word)
    }

    /// Plain store to the slot at `p`.
    ///
    /// # Safety
    ///
    /// `p` must be valid for writes of `Self::WIDTH` bytes and aligned to it.
    #[inline(always)]
    unsafe fn store(p: Addr, word: Self::Word) {
        ptr::write(p as *mut Self::Word, word)
    }
}

/// Slot holding a 32-bit compressed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compressed;

/// Slot holding a full-width absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uncompressed;

impl sealed::Sealed for Compressed {}
impl sealed::Sealed for Uncompressed {}

impl SlotEncoding for Compressed {
    const COMPRESSED: bool = true;
    type Word = u32;

    #[inline(always)]
    fn encode(encoding: &CompressEncoding, address: Addr) -> u32 {
        encoding.encode(address)
    }

    #[inline(always)]
    fn decode(encoding: &CompressEncoding, word: u32) -> Addr {
        encoding.decode(word)
    }
}

impl SlotEncoding for Uncompressed {
    const COMPRESSED: bool = false;
    type Word = Addr;

    #[inline(always)]
    fn encode(_encoding: &CompressEncoding, address: Addr) -> Addr {
        address
    }

    #[inline(always)]
    fn decode(_encoding: &CompressEncoding, word: Addr) -> Addr {
        word
    }
}

// Slot layout is fixed per marker at compile time.
const _: () = assert!(
    Compressed::COMPRESSED
        && !Uncompressed::COMPRESSED
        && Compressed::WIDTH == 4
        && Uncompressed::WIDTH == core::mem::size_of::<Addr>()
);
