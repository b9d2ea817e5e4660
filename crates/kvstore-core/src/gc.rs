// SPDX-License-Identifier: MIT

//! The tombstone set and the three garbage-collection stages.
//!
//! The tombstone set is an intrusive doubly-linked list threaded through
//! slot records, kept sorted ascending by heap offset (the slot at
//! `garbage_head` borders the lowest address). The allocator does not walk
//! this list for reuse — it scans the whole slot stack instead — but every
//! GC stage and the size/count introspection below does.

use crate::header::NONE;
use crate::heap;
use crate::slot::Slot;
use crate::store::Store;

/// Splices `index` into the tombstone list in ascending-heap-offset order
/// and marks its slot as garbage. The slot must not already be garbage.
pub(crate) fn garbage_list_insert(store: &mut Store<'_>, index: u32) {
    let mut slot = store.get_slot(index);
    slot.trash();

    let mut header = store.header();
    let mut prev = NONE;
    let mut next = header.garbage_head;
    while next != NONE {
        let candidate = store.get_slot(next);
        if candidate.heap_offset >= slot.heap_offset {
            break;
        }
        prev = next;
        next = candidate.garbage_next;
    }

    slot.garbage_prev = prev;
    slot.garbage_next = next;
    store.set_slot(index, slot);

    if prev == NONE {
        header.garbage_head = index;
    } else {
        let mut prev_slot = store.get_slot(prev);
        prev_slot.garbage_next = index;
        store.set_slot(prev, prev_slot);
    }

    if next == NONE {
        header.garbage_tail = index;
    } else {
        let mut next_slot = store.get_slot(next);
        next_slot.garbage_prev = index;
        store.set_slot(next, next_slot);
    }

    store.set_header(header);
}

/// Removes `index` from the tombstone list, fixing up its neighbors. Does
/// not touch `index`'s own flag or links; callers that reuse or relocate
/// the slot set those themselves.
pub(crate) fn garbage_list_unlink(store: &mut Store<'_>, index: u32) {
    let slot = store.get_slot(index);
    let prev = slot.garbage_prev;
    let next = slot.garbage_next;

    let mut header = store.header();
    if prev == NONE {
        header.garbage_head = next;
    } else {
        let mut prev_slot = store.get_slot(prev);
        prev_slot.garbage_next = next;
        store.set_slot(prev, prev_slot);
    }
    if next == NONE {
        header.garbage_tail = prev;
    } else {
        let mut next_slot = store.get_slot(next);
        next_slot.garbage_prev = prev;
        store.set_slot(next, next_slot);
    }
    store.set_header(header);
}

impl Store<'_> {
    /// Total bytes tied up in tombstones: each tombstone's hunk plus its
    /// own slot record, matching what [`Store::garbage_pop`] actually
    /// reclaims per tombstone.
    #[must_use]
    pub fn garbage_size(&self) -> usize {
        let mut total = 0usize;
        let mut cur = self.header().garbage_head;
        while cur != NONE {
            let slot = self.get_slot(cur);
            total += slot.total_size() as usize;
            cur = slot.garbage_next;
        }
        total
    }

    /// Number of tombstoned slots.
    #[must_use]
    pub fn garbage_count(&self) -> usize {
        let mut count = 0usize;
        let mut cur = self.header().garbage_head;
        while cur != NONE {
            count += 1;
            cur = self.get_slot(cur).garbage_next;
        }
        count
    }

    /// Reclaims tombstones physically bordering the current top of the heap
    /// (the lowest used address), where the slot stack's topmost slot's
    /// hunk begins exactly at `heap_top`.
    ///
    /// Walks down from the top of the stack, popping one tombstone — its
    /// slot record and its hunk — at a time, stopping at the first live
    /// slot, an empty stack, or once reclaiming the next tombstone would
    /// exceed `budget`. Cheapest of the three stages: it moves nothing,
    /// only shrinks the stack and the heap from their respective tops.
    ///
    /// Returns the number of bytes reclaimed (slot record plus hunk, for
    /// every tombstone popped).
    pub fn garbage_pop(&mut self, budget: usize) -> usize {
        let mut reclaimed = 0usize;
        loop {
            let header = self.header();
            if header.slot_count == 0 {
                break;
            }
            let top = header.slot_count - 1;
            let slot = self.get_slot(top);
            if !slot.is_garbage() || slot.heap_offset != header.heap_top() {
                break;
            }
            let freed = slot.total_size() as usize;
            if freed > budget - reclaimed {
                break;
            }

            garbage_list_unlink(self, top);
            let mut header = self.header();
            header.slot_count -= 1;
            heap::pop(&mut header, slot.heap_size);
            if header.last_found == top {
                header.last_found = NONE;
            }
            self.set_header(header);
            reclaimed += freed;
        }
        reclaimed
    }

    /// Migrates live payload into same-size tombstones, clustering garbage
    /// toward the top of the stack where a later `garbage_pop` can reclaim
    /// it.
    ///
    /// Walks the stack top-down (newest first) looking for a live slot,
    /// and in lockstep walks bottom-up (oldest first) looking for a
    /// tombstone. Once both are found, scans from the live candidate back
    /// toward the bottom for the first live slot whose hunk is exactly the
    /// tombstone's size; if one is found and moving it fits in the
    /// remaining budget, its key and value bytes are copied into the
    /// tombstone's hunk and the two slots swap live/garbage status. No
    /// slot is removed; this only repositions which slots are garbage.
    ///
    /// Returns the number of bytes moved.
    pub fn garbage_fold(&mut self, budget: usize) -> usize {
        if budget == 0 || self.garbage_size() == 0 {
            return 0;
        }

        let count = self.header().slot_count;
        if count == 0 {
            return 0;
        }

        let mut moved = 0usize;
        let mut top = count - 1;
        let mut btm = 0u32;

        loop {
            if top < btm {
                break;
            }

            let top_slot = self.get_slot(top);
            if top_slot.is_garbage() {
                if top == 0 {
                    break;
                }
                top -= 1;
                continue;
            }

            let btm_slot = self.get_slot(btm);
            if !btm_slot.is_garbage() {
                btm += 1;
                if btm >= count {
                    break;
                }
                continue;
            }

            let mut matched = None;
            for search in (btm..=top).rev() {
                let candidate = self.get_slot(search);
                if !candidate.is_garbage() && candidate.heap_size == btm_slot.heap_size {
                    matched = Some((search, candidate));
                    break;
                }
            }

            if let Some((live_index, live_slot)) = matched {
                let cost = live_slot.heap_size as usize;
                if moved + cost <= budget {
                    self.fold_pair(btm, live_index, &live_slot);
                    moved += cost;
                }
            }

            if top == 0 {
                break;
            }
            top -= 1;
            btm += 1;
            if btm >= count {
                break;
            }
        }

        moved
    }

    /// Copies `live_slot`'s bytes into the tombstone at `tombstone_index`
    /// (whose hunk is already the same size) and swaps which slot is
    /// garbage.
    fn fold_pair(&mut self, tombstone_index: u32, live_index: u32, live_slot: &Slot) {
        let tombstone_slot = self.get_slot(tombstone_index);
        debug_assert_eq!(tombstone_slot.heap_size, live_slot.heap_size);

        let src_start = live_slot.heap_offset as usize;
        let len = live_slot.heap_size as usize;
        self.buf
            .copy_within(src_start..src_start + len, tombstone_slot.heap_offset as usize);

        garbage_list_unlink(self, tombstone_index);
        let new_live = Slot::new(
            tombstone_slot.heap_offset,
            tombstone_slot.heap_size,
            live_slot.key_len,
            live_slot.value_len,
        );
        self.set_slot(tombstone_index, new_live);

        self.invalidate_cache_if(live_index);
        garbage_list_insert(self, live_index);
    }

    /// Coalesces adjacent (tombstone, live) slot-stack pairs: the live
    /// hunk moves down to border the tombstone's low end, shrinking to its
    /// own size, and the tombstone takes over the live hunk's former
    /// record at its old size. Only pairs whose hunks are physically
    /// adjacent in the heap are eligible — a prior [`Store::sort_by_key`]
    /// or [`Store::sort_by_heap`] can break that adjacency, in which case
    /// the pair is skipped.
    ///
    /// Returns the number of bytes moved. Stops once the next pair's cost
    /// would exceed `budget`.
    pub fn garbage_pack(&mut self, budget: usize) -> usize {
        if budget == 0 {
            return 0;
        }
        let count = self.header().slot_count;
        if count < 2 {
            return 0;
        }

        let mut moved = 0usize;
        for dest_index in 0..count - 1 {
            let src_index = dest_index + 1;
            let dest_slot = self.get_slot(dest_index);
            let src_slot = self.get_slot(src_index);

            if !dest_slot.is_garbage() || src_slot.is_garbage() {
                continue;
            }
            if src_slot.heap_end() != dest_slot.heap_offset {
                continue;
            }

            let cost = src_slot.heap_size as usize;
            if moved + cost > budget {
                break;
            }

            self.pack_pair(dest_index, &dest_slot, src_index, &src_slot);
            moved += cost;
        }

        moved
    }

    /// Moves `src_slot`'s live payload to the top of the combined
    /// `(dest_slot, src_slot)` region, leaving the tombstone at the
    /// bottom of that region under `src_index`'s slot record.
    fn pack_pair(&mut self, dest_index: u32, dest_slot: &Slot, src_index: u32, src_slot: &Slot) {
        let new_dest_offset = dest_slot.heap_offset + dest_slot.heap_size - src_slot.heap_size;

        let src_start = src_slot.heap_offset as usize;
        let len = src_slot.heap_size as usize;
        self.buf
            .copy_within(src_start..src_start + len, new_dest_offset as usize);

        garbage_list_unlink(self, dest_index);
        let new_live = Slot::new(
            new_dest_offset,
            src_slot.heap_size,
            src_slot.key_len,
            src_slot.value_len,
        );
        self.set_slot(dest_index, new_live);

        self.invalidate_cache_if(src_index);
        let new_tombstone = Slot::new(src_slot.heap_offset, dest_slot.heap_size, 0, 0);
        self.set_slot(src_index, new_tombstone);
        garbage_list_insert(self, src_index);
    }

    /// Combines pairs of heap-adjacent tombstones into one larger
    /// tombstone, physically removing the absorbed slot record from the
    /// stack rather than leaving a zero-size stub behind.
    ///
    /// Heap adjacency is required; slot-stack adjacency is not (spec.md
    /// §4.8). Walks the tombstone list — `garbage_head`/`garbage_next`,
    /// kept in ascending heap-offset order by [`garbage_list_insert`] —
    /// rather than consecutive stack indices, so two tombstones that
    /// border each other in the heap are merged even if [`Store::sort_by_key`]
    /// or [`Store::sort_by_heap`] left their slot records far apart on the
    /// stack.
    ///
    /// Returns the total size of every merged tombstone (the size of the
    /// surviving, combined tombstone for each pair merged — unlike
    /// [`Store::garbage_pack`], a merge always shrinks `count` by one per
    /// pair, since one of the two slot records disappears).
    pub fn garbage_merge(&mut self) -> usize {
        let mut merged_total = 0usize;
        let mut cur = self.header().garbage_head;

        while cur != NONE {
            let cur_slot = self.get_slot(cur);
            let next = cur_slot.garbage_next;
            if next == NONE {
                break;
            }
            let next_slot = self.get_slot(next);

            if cur_slot.heap_end() != next_slot.heap_offset {
                cur = next;
                continue;
            }

            garbage_list_unlink(self, cur);
            garbage_list_unlink(self, next);

            let keep = cur.min(next);
            let removed = cur.max(next);
            let combined_size = cur_slot.heap_size + next_slot.heap_size;
            self.set_slot(keep, Slot::new(cur_slot.heap_offset, combined_size, 0, 0));
            garbage_list_insert(self, keep);

            self.remove_slot(removed);
            merged_total += combined_size as usize;

            // Re-examine from the merged node: it may now be heap-adjacent
            // to whatever follows it in the list, cascading a run of three
            // or more adjacent tombstones into one.
            cur = keep;
        }
        merged_total
    }

    /// Physically removes slot `index` from the stack, shifting every
    /// slot above it down by one position and fixing up every stale index
    /// reference: `last_found`, the tombstone list head/tail, and every
    /// remaining slot's own list links.
    fn remove_slot(&mut self, index: u32) {
        let mut header = self.header();
        let count = header.slot_count;
        debug_assert!(index < count);

        for i in index..count - 1 {
            let next = self.get_slot(i + 1);
            self.set_slot(i, next);
        }

        header.slot_count -= 1;
        let new_count = header.slot_count;

        let remap = |idx: u32| -> u32 {
            match idx {
                NONE => NONE,
                i if i == index => NONE,
                i if i > index => i - 1,
                i => i,
            }
        };

        header.last_found = remap(header.last_found);
        header.garbage_head = remap(header.garbage_head);
        header.garbage_tail = remap(header.garbage_tail);
        self.set_header(header);

        for i in 0..new_count {
            let mut slot = self.get_slot(i);
            let new_prev = remap(slot.garbage_prev);
            let new_next = remap(slot.garbage_next);
            if new_prev != slot.garbage_prev || new_next != slot.garbage_next {
                slot.garbage_prev = new_prev;
                slot.garbage_next = new_next;
                self.set_slot(i, slot);
            }
        }
    }

    /// Runs `pop`, then `fold`, then `pack`, each against the budget left
    /// over from the previous stage.
    ///
    /// Returns the total bytes reclaimed or moved across all three
    /// stages.
    pub fn garbage_collect(&mut self, budget: usize) -> usize {
        if budget == 0 || self.garbage_size() == 0 {
            return 0;
        }

        let mut remaining = budget;
        let mut total = 0usize;

        let popped = self.garbage_pop(remaining);
        total += popped;
        remaining = remaining.saturating_sub(popped);
        if remaining == 0 {
            return total;
        }

        let folded = self.garbage_fold(remaining);
        total += folded;
        remaining = remaining.saturating_sub(folded);
        if remaining == 0 {
            return total;
        }

        total += self.garbage_pack(remaining);
        total
    }

    /// Runs [`Store::garbage_collect`] with a budget large enough to cover
    /// every byte currently tied up in tombstones.
    ///
    /// Returns the total bytes reclaimed or moved.
    pub fn garbage_clean(&mut self) -> usize {
        let budget = self.garbage_size();
        self.garbage_collect(budget)
    }
}

#[cfg(test)]
mod gc_test;
