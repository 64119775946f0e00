//! Free-list engine.
//!
//! Maintains a singly-linked, address-ordered chain of free blocks within a
//! single arena. The forward link lives inside the block itself while it is
//! free, overlapping what will later become payload once the block is
//! handed out — the same intrusive-list trick the kernel's own free-list
//! allocator uses, so that a free block costs nothing beyond its header.
//!
//! # Invariants
//! - The list is sorted by ascending header address and has no cycles.
//! - Every node's `payload` field is the number of usable bytes following
//!   its header, and is always at least 1.

use crate::header::{BlockHeader, HEADER_ALIGN, HEADER_SIZE, align_up};
use std::ptr;

/// The rule used by [`FreeList::take`] to choose among qualifying blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStrategy {
    /// The first block satisfying the request, in list (address) order.
    First,
    /// The smallest qualifying block; ties favor the earliest in list order.
    Best,
}

/// A singly-linked, address-ordered chain of free blocks belonging to one arena.
pub(crate) struct FreeList {
    head: *mut BlockHeader,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self {
            head: ptr::null_mut(),
        }
    }

    /// Seeds the list with a single free block spanning `[base, base + length)`.
    ///
    /// # Safety
    /// `base` must be valid, writable, and exclusively owned for `length`
    /// bytes and suitably aligned for [`BlockHeader`]; `length` must exceed
    /// `HEADER_SIZE + 1`.
    pub(crate) unsafe fn seed(&mut self, base: *mut u8, length: usize) {
        debug_assert!(length > HEADER_SIZE + 1);
        let node = base.cast::<BlockHeader>();
        unsafe {
            ptr::write(node, BlockHeader::new(length - HEADER_SIZE));
        }
        self.head = node;
    }

    /// Finds a free block whose payload is at least `n` bytes, splitting off
    /// the remainder when it would hold a header plus at least one payload
    /// byte, and returns the payload address. Returns `None` if no block
    /// qualifies.
    ///
    /// Requested bytes are rounded up to header alignment so that any
    /// interior header written after the granted block stays aligned; the
    /// returned region still guarantees at least `n` usable bytes.
    ///
    /// # Safety
    /// The list invariants (sorted, non-overlapping, terminating) must hold.
    pub(crate) unsafe fn take(&mut self, n: usize, strategy: FitStrategy) -> Option<*mut u8> {
        let want = align_up(n.max(1), HEADER_ALIGN);

        // `prev` is `None` when the candidate is the list head.
        let mut prev: Option<*mut BlockHeader> = None;
        let mut node = self.head;
        let mut chosen: Option<(Option<*mut BlockHeader>, *mut BlockHeader)> = None;

        while !node.is_null() {
            let payload = unsafe { (*node).payload };
            if payload >= want {
                match strategy {
                    FitStrategy::First => {
                        chosen = Some((prev, node));
                        break;
                    }
                    FitStrategy::Best => {
                        let is_better = match chosen {
                            None => true,
                            Some((_, best)) => payload < unsafe { (*best).payload },
                        };
                        if is_better {
                            chosen = Some((prev, node));
                        }
                    }
                }
            }
            prev = Some(node);
            node = unsafe { (*node).next };
        }

        let (sel_prev, sel) = chosen?;
        let sel_payload = unsafe { (*sel).payload };
        let sel_next = unsafe { (*sel).next };
        let remainder = sel_payload.checked_sub(want + HEADER_SIZE).filter(|&r| r >= 1);

        match remainder {
            Some(remainder) => {
                // Split: the tail becomes a new free block in `sel`'s old slot.
                let new_addr = (sel as usize + HEADER_SIZE + want) as *mut BlockHeader;
                unsafe {
                    ptr::write(new_addr, BlockHeader::new(remainder));
                    (*new_addr).next = sel_next;
                    (*sel).payload = want;
                }
                self.link(sel_prev, new_addr);
            }
            None => {
                // No-split: the whole block is granted, unlinked entirely.
                self.link(sel_prev, sel_next);
            }
        }

        Some((sel as usize + HEADER_SIZE) as *mut u8)
    }

    /// Inserts the block whose header is at `block_addr` at the address-sorted
    /// position, then, if `merge` is set, coalesces it with its free
    /// neighbours. Forward merging runs before backward merging so a block
    /// sandwiched between two free neighbours collapses into one block in a
    /// single call.
    ///
    /// # Safety
    /// `block_addr` must be the header address of a block previously carved
    /// from this list by [`FreeList::take`] (or seeded by [`FreeList::seed`])
    /// and not currently free.
    pub(crate) unsafe fn give_back(&mut self, block_addr: *mut u8, merge: bool) {
        let node = block_addr.cast::<BlockHeader>();

        let mut prev: Option<*mut BlockHeader> = None;
        let mut cur = self.head;
        while !cur.is_null() && (cur as usize) < (node as usize) {
            prev = Some(cur);
            cur = unsafe { (*cur).next };
        }
        unsafe {
            (*node).next = cur;
        }
        self.link(prev, node);

        if merge {
            unsafe {
                self.merge_forward(node);
            }
            if let Some(p) = prev {
                unsafe {
                    self.merge_forward(p);
                }
            }
        }
    }

    /// Absorbs `node`'s successor into `node` if the two are physically adjacent.
    ///
    /// # Safety
    /// `node` must be a live node in this list.
    unsafe fn merge_forward(&mut self, node: *mut BlockHeader) {
        unsafe {
            let next = (*node).next;
            if next.is_null() {
                return;
            }
            let end = node as usize + HEADER_SIZE + (*node).payload;
            if end == next as usize {
                (*node).payload += HEADER_SIZE + (*next).payload;
                (*node).next = (*next).next;
            }
        }
    }

    fn link(&mut self, prev: Option<*mut BlockHeader>, target: *mut BlockHeader) {
        match prev {
            None => self.head = target,
            Some(p) => unsafe {
                (*p).next = target;
            },
        }
    }

    /// Returns `(free_block_count, free_bytes, largest_free_block)`.
    pub(crate) fn stats(&self) -> (usize, usize, usize) {
        let mut count = 0;
        let mut total = 0;
        let mut largest = 0;
        let mut node = self.head;
        while !node.is_null() {
            let payload = unsafe { (*node).payload };
            count += 1;
            total += payload;
            largest = largest.max(payload);
            node = unsafe { (*node).next };
        }
        (count, total, largest)
    }

    /// Payload sizes of every free block, in list (address) order.
    pub(crate) fn payload_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut node = self.head;
        while !node.is_null() {
            sizes.push(unsafe { (*node).payload });
            node = unsafe { (*node).next };
        }
        sizes
    }
}
