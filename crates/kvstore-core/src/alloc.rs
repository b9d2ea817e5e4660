// SPDX-License-Identifier: MIT

//! Allocation: reusing a tombstoned hunk of the right size when one exists,
//! otherwise bump-allocating a new slot and a new hunk.

use crate::header::NONE;
use crate::heap;
use crate::slot::{SLOT_SIZE, Slot};
use crate::store::Store;

impl Store<'_> {
    /// Finds the first (lowest slot index) tombstone whose hunk is exactly
    /// `hunk_size` bytes, scanning the slot stack bottom-up.
    ///
    /// Scans every slot rather than just the garbage list: the garbage
    /// list is kept for `garbage_size`/`garbage_count`/GC bookkeeping, but
    /// reuse here only cares about hunk size, which the slot record itself
    /// already carries.
    fn find_reusable_hunk(&self, hunk_size: u32) -> Option<u32> {
        let count = self.header().slot_count;
        (0..count).find(|&i| {
            let slot = self.get_slot(i);
            slot.is_garbage() && slot.heap_size == hunk_size
        })
    }

    /// Allocates a slot for a new key/value pair of the given sizes,
    /// reusing a same-size tombstone if one exists, otherwise bump
    /// allocating from both the slot stack and the heap.
    ///
    /// Returns the slot index on success. The slot's hunk bytes are
    /// uninitialized (or hold the prior tombstone's bytes); callers must
    /// write key and value data immediately.
    pub(crate) fn allocate(&mut self, key_len: u8, value_len: u32) -> Option<u32> {
        let header = self.header();
        // +1 reserves the trailing NUL that `kv::write_keyvalue` always
        // writes after the key bytes.
        let hunk_size =
            heap::hunk_size_for(header.hunk_granule, u32::from(key_len) + 1, value_len);

        if let Some(index) = self.find_reusable_hunk(hunk_size) {
            crate::gc::garbage_list_unlink(self, index);
            let mut slot = self.get_slot(index);
            slot.recycle();
            slot.key_len = key_len;
            slot.value_len = value_len;
            self.set_slot(index, slot);
            return Some(index);
        }

        let mut header = self.header();
        let index = header.slot_count;
        let stack_end_after = header.stack_end(SLOT_SIZE) + SLOT_SIZE as u32;
        let current_heap_top = header.heap_top();

        // Checked up front, in terms of the *current* (always-valid) heap
        // top rather than the post-push one: `heap_size` is a u32 counter
        // with no headroom above `total_size`, so computing the
        // prospective new top before confirming it fits risks overflow
        // on a hunk_size that dwarfs the buffer, not just an ordinary
        // collision.
        if hunk_size > current_heap_top || current_heap_top - hunk_size < stack_end_after {
            return None;
        }

        header.slot_count += 1;
        let heap_top = heap::push(&mut header, hunk_size);
        debug_assert_eq!(heap_top, current_heap_top - hunk_size);

        self.set_header(header);
        self.set_slot(index, Slot::new(heap_top, hunk_size, key_len, value_len));
        debug_assert_eq!(self.get_slot(index).garbage_prev, NONE);
        Some(index)
    }
}

#[cfg(test)]
mod alloc_test;
