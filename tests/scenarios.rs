//! End-to-end allocator scenarios exercising the public API the way a host
//! process would, mirroring `kernel-sync`'s practice of testing a crate's
//! externally observable behaviour from a `tests/` integration file rather
//! than from inline unit tests.

use arena_alloc::{AllocError, Allocator, FitStrategy};

const SMALL_ARENA_BYTES: usize = 2 * 1024 * 1024;

/// S1 — split and coalesce: a single alloc/free round-trip on a fresh
/// allocator restores the small arena's free-byte total.
#[test]
fn split_and_coalesce_round_trip() {
    let mut alloc = Allocator::new();
    let initial = alloc.alloc(8).unwrap();
    alloc.free(Some(initial));
    let baseline = alloc.free_bytes();

    let p = alloc.alloc(64).unwrap();
    assert_eq!(alloc.free_bytes(), baseline - Allocator::req_bytes(64));

    alloc.free(Some(p));
    assert_eq!(alloc.free_bytes(), baseline);
    assert_eq!(alloc.arena_stats(0).unwrap().block_count, 1);
}

/// S2 — best-fit vs. first-fit selection among blocks of payload 320, 96, 200
/// (multiples of the header's alignment, so `take`'s internal rounding is a
/// no-op and the chosen-block assertions stay exact).
#[test]
fn best_fit_and_first_fit_selection() {
    let mut best = Allocator::with_policy(arena_alloc::Policy {
        fit_strategy: FitStrategy::Best,
        merge_enabled: false,
    });
    let a = best.alloc(320).unwrap();
    let b = best.alloc(96).unwrap();
    let c = best.alloc(200).unwrap();
    best.free(Some(a));
    best.free(Some(b));
    best.free(Some(c));

    let served = best.alloc(80).unwrap();
    assert_eq!(served, b, "best-fit is served from the 96-byte block");

    let mut first = Allocator::with_policy(arena_alloc::Policy {
        fit_strategy: FitStrategy::First,
        merge_enabled: false,
    });
    let a = first.alloc(320).unwrap();
    let b = first.alloc(96).unwrap();
    let c = first.alloc(200).unwrap();
    first.free(Some(a));
    first.free(Some(b));
    first.free(Some(c));

    let served = first.alloc(80).unwrap();
    assert_eq!(served, a, "first-fit is served from the 320-byte block");
}

/// S3 — size-class routing: requests of increasing size land in the small,
/// medium, and large arenas respectively, and freeing one never touches the
/// statistics of another.
#[test]
fn size_class_routing_is_independent_per_arena() {
    let mut alloc = Allocator::new();
    let p1 = alloc.alloc(100).unwrap();
    let p2 = alloc.alloc(20_000).unwrap();
    let p3 = alloc.alloc(40_000).unwrap();

    let small_before = alloc.arena_stats(0).unwrap().free_bytes;
    alloc.free(Some(p2));
    assert_eq!(alloc.arena_stats(0).unwrap().free_bytes, small_before);

    alloc.free(Some(p1));
    alloc.free(Some(p3));
}

/// S4 — exhaustion: two allocations of half the arena's payload capacity
/// fill it (the second fails because the first split leaves a remainder
/// just short of half), and freeing the survivor restores a single
/// arena-spanning free block.
#[test]
fn half_capacity_allocations_exhaust_the_small_arena() {
    let mut alloc = Allocator::new();
    let capacity = SMALL_ARENA_BYTES - arena_alloc_header_overhead();
    let half = capacity / 2;

    let p1 = alloc.alloc(half).unwrap();
    let p2 = alloc.alloc(half);
    assert!(matches!(p2, Err(AllocError::NoSpace)));

    alloc.free(Some(p1));
    let stats = alloc.arena_stats(0).unwrap();
    assert_eq!(stats.block_count, 1);
    assert_eq!(stats.free_bytes, capacity);
}

/// S5 — three-way coalesce: freeing three physically adjacent blocks in
/// A, C, B order merges them into a single free block.
#[test]
fn three_way_coalesce_merges_adjacent_blocks() {
    let mut alloc = Allocator::new();
    let a = alloc.alloc(128).unwrap();
    let b = alloc.alloc(128).unwrap();
    let c = alloc.alloc(128).unwrap();

    alloc.free(Some(a));
    alloc.free(Some(c));
    alloc.free(Some(b));

    assert_eq!(alloc.arena_stats(0).unwrap().block_count, 1);
}

#[test]
fn zero_byte_request_fails_without_changing_state() {
    let mut alloc = Allocator::new();
    let before = alloc.free_bytes();
    assert!(matches!(alloc.alloc(0), Err(AllocError::ZeroSizeRequest)));
    assert_eq!(alloc.free_bytes(), before);
}

#[test]
fn oversized_request_fails_in_its_own_class() {
    let mut alloc = Allocator::new();
    // Larger than the large arena's total capacity.
    let result = alloc.alloc(64 * 1024 * 1024);
    assert!(matches!(result, Err(AllocError::NoSpace)));
}

#[test]
fn free_of_none_is_a_no_op() {
    let mut alloc = Allocator::new();
    alloc.free(None);
}

#[test]
fn dump_does_not_panic_before_or_after_initialisation() {
    let mut alloc = Allocator::new();
    alloc.dump();
    let p = alloc.alloc(32).unwrap();
    alloc.dump();
    alloc.free(Some(p));
    alloc.dump();
}

/// The fixed per-block overhead, exposed indirectly through `req_bytes`.
fn arena_alloc_header_overhead() -> usize {
    Allocator::req_bytes(0)
}
