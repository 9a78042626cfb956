//! Encoding Law - randomized checks of encode/decode against slots
//!
//! Addresses are drawn from a seeded generator so failures reproduce. Every
//! property is checked through the accessor, not just the bare encoding, so
//! the slot width and the raw bits are covered too.

mod common;

use common::{accessor, policies, TestObject, TEST_HEAP_BASE, TEST_SHIFT};
use heapref::{Addr, CompressEncoding, EncodingPolicy, Obj};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5eed_0f_4eaf;
const SAMPLES: usize = 2_000;

/// Random non-null address representable under `encoding`
fn random_address(rng: &mut StdRng, encoding: &CompressEncoding) -> Addr {
    let compressed: u32 = rng.gen_range(1..=u32::MAX);
    encoding.base() + ((compressed as usize) << encoding.shift())
}

/// Round trip through a slot returns the stored address for every policy
///
/// **Invariant verified:** read(write(A)) == A for null and representable A.
#[test]
fn test_round_trip_under_every_policy() {
    let mut rng = StdRng::seed_from_u64(SEED);

    for policy in policies() {
        let access = accessor(policy);
        let compressed = policy.compressed_enabled();
        let mut slot: usize = 0;
        let p = &mut slot as *mut usize as Addr;

        for _ in 0..SAMPLES {
            let address = if compressed {
                random_address(&mut rng, &policy.encoding())
            } else {
                rng.gen::<usize>() & !0x7
            };
            let handle = unsafe { Obj::from_untracked(address) };

            unsafe {
                access.write_object_at(p, handle, compressed);
                assert_eq!(
                    access.read_object_as_untracked(p, compressed),
                    address,
                    "round trip failed under {}",
                    policy
                );
            }
        }
    }
}

/// Raw compressed bits are exactly `(A - base) >> shift`
///
/// **Bug this finds:** a store that writes the absolute address, or that
/// forgets to subtract the base before shifting.
#[test]
fn test_raw_bits_match_law() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);
    let policy = EncodingPolicy::compressed(TEST_HEAP_BASE, TEST_SHIFT);
    let access = accessor(policy);
    let mut slot: u32 = 0;
    let p = &mut slot as *mut u32 as Addr;

    for _ in 0..SAMPLES {
        let address = random_address(&mut rng, &policy.encoding());
        unsafe {
            access.write_object_at(p, Obj::from_untracked(address), true);
        }
        assert_eq!(slot as usize, (address - TEST_HEAP_BASE) >> TEST_SHIFT);
    }
}

/// Null is zero in both encodings, whatever the base
#[test]
fn test_null_is_zero_everywhere() {
    for policy in policies() {
        let access = accessor(policy);
        if policy.compressed_enabled() {
            let mut slot: u32 = u32::MAX;
            let p = &mut slot as *mut u32 as Addr;
            unsafe {
                access.write_object_at(p, Obj::NULL, true);
                assert!(access.read_object_at(p, true).is_null());
            }
            assert_eq!(slot, 0, "null must encode to zero under {}", policy);
        } else {
            let mut slot: usize = usize::MAX;
            let p = &mut slot as *mut usize as Addr;
            unsafe {
                access.write_object_at(p, Obj::NULL, false);
                assert!(access.read_object_at(p, false).is_null());
            }
            assert_eq!(slot, 0);
        }
    }
}

/// Compressed stores touch exactly four bytes
///
/// **Bug this finds:** a compressed store performed at word width, which
/// clobbers the neighbouring field.
#[test]
fn test_compressed_store_is_four_bytes_wide() {
    let policy = EncodingPolicy::compressed(TEST_HEAP_BASE, TEST_SHIFT);
    let access = accessor(policy);
    let mut object = TestObject::new();
    object.words = [usize::MAX; common::OBJECT_WORDS];
    let obj = object.handle();
    let value = unsafe { Obj::from_untracked(TEST_HEAP_BASE + 0x40) };

    unsafe {
        access.write_object_at(obj.field_address(8), value, true);
    }

    assert_eq!(object.read_u32(8), 8);
    assert_eq!(object.read_u32(12), u32::MAX, "neighbouring field was clobbered");
    assert_eq!(object.read_word(0), usize::MAX);
    assert_eq!(object.read_word(16), usize::MAX);
}

/// Uncompressed slots store any address verbatim, even under compression
#[test]
fn test_uncompressed_root_under_compression() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 2);
    let access = accessor(EncodingPolicy::compressed(TEST_HEAP_BASE, TEST_SHIFT));
    let mut slot: usize = 0;
    let p = &mut slot as *mut usize as Addr;

    for _ in 0..SAMPLES {
        let address = rng.gen::<usize>() | 1;
        unsafe {
            access.write_object_at(p, Obj::from_untracked(address), false);
        }
        assert_eq!(slot, address, "uncompressed slots are never encoded");
    }
}

/// The lowest usable address is one granule above the base
#[test]
fn test_base_is_not_representable() {
    let encoding = CompressEncoding::new(TEST_HEAP_BASE, TEST_SHIFT);
    assert!(!encoding.is_representable(TEST_HEAP_BASE));
    assert_eq!(encoding.try_encode(TEST_HEAP_BASE), None);
    assert_eq!(encoding.try_encode(TEST_HEAP_BASE + 8), Some(1));
    assert_eq!(encoding.try_encode(TEST_HEAP_BASE + 4), None);
    assert_eq!(encoding.try_encode(encoding.max_address()), Some(u32::MAX));
}
