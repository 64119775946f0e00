//! Arena router.
//!
//! Owns the three size-class arenas and the process-wide fit/merge policy,
//! routes allocations by requested size and releases by pointer address, and
//! exposes aggregated and per-arena diagnostics.
//!
//! Arenas are acquired lazily: nothing is mapped until the first call to
//! [`Allocator::alloc`]. A failed acquisition is permanent — every
//! subsequent `alloc` fails the same way, and `free` degrades to a silent
//! no-op, matching a pointer that can never have come from this allocator.

use crate::free_list::{FitStrategy, FreeList};
use crate::header::HEADER_SIZE;
use crate::region::{self, RegionError};
use std::ptr::NonNull;

/// Payload ceilings for the small and medium classes. Anything larger routes
/// into the large arena rather than being rejected outright — the first of
/// the two split policies documented alongside the source, chosen here and
/// recorded in `DESIGN.md`.
const SMALL_MAX_PAYLOAD: usize = 14 * 1024;
const MEDIUM_MAX_PAYLOAD: usize = 25 * 1024;

const ARENA_BYTES: [usize; 3] = [2 * 1024 * 1024, 4 * 1024 * 1024, 4 * 1024 * 1024];
const ARENA_NAMES: [&str; 3] = ["small", "medium", "large"];

/// Process-wide allocation policy: which free block `take` prefers, and
/// whether `free` coalesces adjacent neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub fit_strategy: FitStrategy,
    pub merge_enabled: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fit_strategy: FitStrategy::Best,
            merge_enabled: true,
        }
    }
}

/// Why an `alloc` call failed. All three variants surface identically as a
/// `fail` to a caller that only checks `is_err()`; the taxonomy exists for
/// callers who want to distinguish them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AllocError {
    #[error("requested allocation of zero bytes")]
    ZeroSizeRequest,
    #[error("no free block in the routed arena satisfies the request")]
    NoSpace,
    #[error("arena initialisation failed: {0}")]
    Initialisation(#[from] RegionError),
}

/// Block count, total free bytes, and largest free block for one arena or
/// aggregated across all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub block_count: usize,
    pub free_bytes: usize,
    pub largest_block: usize,
}

struct Arena {
    base: usize,
    len: usize,
    free: FreeList,
}

impl Arena {
    const fn empty() -> Self {
        Self {
            base: 0,
            len: 0,
            free: FreeList::new(),
        }
    }

    fn contains(&self, addr: usize) -> bool {
        self.len != 0 && addr >= self.base && addr < self.base + self.len
    }
}

enum Init {
    Pending,
    Ready,
    Failed(RegionError),
}

/// Owns the three size-class arenas and the process-wide policy flags.
///
/// Single-threaded by design (see the crate's Non-goals): every method
/// above takes `&mut self` except the read-only diagnostics, so external
/// mutual exclusion is the caller's responsibility if shared across threads.
pub struct Allocator {
    arenas: [Arena; 3],
    policy: Policy,
    init: Init,
}

impl Allocator {
    /// Builds an allocator with the default policy (best-fit, merging
    /// enabled). No memory is reserved until the first `alloc`.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_policy(Policy {
            fit_strategy: FitStrategy::Best,
            merge_enabled: true,
        })
    }

    /// Builds an allocator with an explicit starting policy.
    #[must_use]
    pub const fn with_policy(policy: Policy) -> Self {
        Self {
            arenas: [Arena::empty(), Arena::empty(), Arena::empty()],
            policy,
            init: Init::Pending,
        }
    }

    pub fn set_fit_strategy(&mut self, strategy: FitStrategy) {
        self.policy.fit_strategy = strategy;
    }

    pub fn set_merge_enabled(&mut self, enabled: bool) {
        self.policy.merge_enabled = enabled;
    }

    #[must_use]
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    fn ensure_init(&mut self) -> Result<(), AllocError> {
        match &self.init {
            Init::Ready => return Ok(()),
            Init::Failed(err) => return Err(AllocError::Initialisation(err.clone())),
            Init::Pending => {}
        }
        for (arena, &bytes) in self.arenas.iter_mut().zip(ARENA_BYTES.iter()) {
            match region::acquire(bytes) {
                Ok(addr) => {
                    let base = addr.as_ptr() as usize;
                    // SAFETY: `addr` is a fresh, exclusively-owned region of `bytes` length.
                    unsafe {
                        arena.free.seed(addr.as_ptr(), bytes);
                    }
                    arena.base = base;
                    arena.len = bytes;
                }
                Err(err) => {
                    self.init = Init::Failed(err.clone());
                    return Err(AllocError::Initialisation(err));
                }
            }
        }
        self.init = Init::Ready;
        Ok(())
    }

    fn class_for(n: usize) -> usize {
        if n <= SMALL_MAX_PAYLOAD {
            0
        } else if n <= MEDIUM_MAX_PAYLOAD {
            1
        } else {
            2
        }
    }

    /// Allocates `n` payload bytes, routing by size to the small, medium, or
    /// large arena. `n == 0` always fails; a size-class exhaustion never
    /// falls through to a larger arena.
    ///
    /// # Errors
    /// Returns [`AllocError::ZeroSizeRequest`] for `n == 0`,
    /// [`AllocError::Initialisation`] if acquiring the backing regions
    /// failed, and [`AllocError::NoSpace`] if the routed arena has no
    /// qualifying free block.
    pub fn alloc(&mut self, n: usize) -> Result<NonNull<u8>, AllocError> {
        if n == 0 {
            return Err(AllocError::ZeroSizeRequest);
        }
        self.ensure_init()?;
        let class = Self::class_for(n);
        let strategy = self.policy.fit_strategy;
        let ptr = unsafe { self.arenas[class].free.take(n, strategy) }.ok_or(AllocError::NoSpace)?;
        // SAFETY: `take` only returns non-null payload addresses.
        Ok(unsafe { NonNull::new_unchecked(ptr) })
    }

    /// Releases a previously allocated block. `None` is a no-op; a pointer
    /// outside every arena's extent is silently ignored, per the allocator's
    /// trust contract with its caller.
    pub fn free(&mut self, p: Option<NonNull<u8>>) {
        let Some(p) = p else { return };
        let block_addr = p.as_ptr() as usize - HEADER_SIZE;
        let merge = self.policy.merge_enabled;
        for arena in &mut self.arenas {
            if arena.contains(block_addr) {
                // SAFETY: `block_addr` falls within this arena and was
                // computed from a pointer the caller claims this allocator
                // returned.
                unsafe {
                    arena.free.give_back(block_addr as *mut u8, merge);
                }
                return;
            }
        }
    }

    /// Pure accounting helper: the total bytes `alloc(n)` would consume from
    /// its arena, including the header.
    #[must_use]
    pub const fn req_bytes(n: usize) -> usize {
        n + HEADER_SIZE
    }

    /// Total free payload bytes across all arenas.
    #[must_use]
    pub fn free_bytes(&self) -> usize {
        self.arenas.iter().map(|a| a.free.stats().1).sum()
    }

    /// Aggregated `(block_count, free_bytes, largest_block)` across all arenas.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let mut agg = ArenaStats::default();
        for arena in &self.arenas {
            let (count, free, largest) = arena.free.stats();
            agg.block_count += count;
            agg.free_bytes += free;
            agg.largest_block = agg.largest_block.max(largest);
        }
        agg
    }

    /// Stats for a single arena (`0` = small, `1` = medium, `2` = large).
    #[must_use]
    pub fn arena_stats(&self, idx: usize) -> Option<ArenaStats> {
        let arena = self.arenas.get(idx)?;
        let (count, free, largest) = arena.free.stats();
        Some(ArenaStats {
            block_count: count,
            free_bytes: free,
            largest_block: largest,
        })
    }

    /// Writes an arrow-separated listing of each arena's free-block payload
    /// sizes to standard output.
    pub fn dump(&self) {
        for (name, arena) in ARENA_NAMES.iter().zip(self.arenas.iter()) {
            let sizes = arena.free.payload_sizes();
            if sizes.is_empty() {
                println!("{name}: (empty)");
                continue;
            }
            let line = sizes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            println!("{name}: {line}");
        }
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}
