//! # Size-Class Arena Allocator
//!
//! A user-space, single-threaded, general-purpose allocator that partitions
//! a handful of OS-provided memory regions into fixed size-class arenas and
//! serves allocations from per-arena free lists.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   Arena Router                      │
//! │   • routes alloc(n) by payload size                 │
//! │   • routes free(p) by pointer address                │
//! │   • holds fit/merge policy, per-arena statistics      │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │                Free-List Engine                      │
//! │   • address-ordered, singly-linked free lists         │
//! │   • first-fit / best-fit search with split            │
//! │   • forward-then-backward coalescing on release       │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │               Raw Region Provider                    │
//! │   • acquires anonymous, zeroed, page-aligned memory   │
//! │     from the host OS via `mmap`                      │
//! │   • regions live for the process lifetime             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Initialisation is lazy: the first call to [`Allocator::alloc`] acquires
//! all three backing regions (small / medium / large) in one go. If any
//! acquisition fails, that failure is permanent for the lifetime of the
//! [`Allocator`] value.
//!
//! ## Non-goals
//!
//! This allocator does not provide thread-safety (a single caller is
//! assumed; wrap it in your own synchronisation if shared across threads),
//! does not return pages to the OS once an arena is acquired, offers no
//! alignment guarantee beyond the block header's natural alignment, has no
//! `realloc`-style in-place growth or zeroed/aligned-allocation variants,
//! and performs no validation against double-free or corrupted pointers —
//! callers are trusted to pass back only pointers this allocator produced.
//!
//! ## Example
//!
//! ```
//! use arena_alloc::Allocator;
//!
//! let mut alloc = Allocator::new();
//! let p = alloc.alloc(64).expect("small allocation should succeed");
//! unsafe { p.as_ptr().write_bytes(0xAB, 64) };
//! alloc.free(Some(p));
//! ```

mod free_list;
mod header;
mod region;
mod router;

pub use free_list::FitStrategy;
pub use region::RegionError;
pub use router::{AllocError, Allocator, ArenaStats, Policy};
