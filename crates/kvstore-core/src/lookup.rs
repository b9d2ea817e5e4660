// SPDX-License-Identifier: MIT

//! Key lookup: a one-slot cache of the last hit, falling back to a linear
//! scan from the newest slot to the oldest.

use crate::header::NONE;
use crate::kv;
use crate::store::Store;

impl Store<'_> {
    /// Finds the slot index holding `key`, or `None` if absent.
    ///
    /// Checks the last-found cache first; a stale cache entry (its slot
    /// has since been deleted, or reused for a different key) is silently
    /// skipped rather than trusted, so the cache never needs eager
    /// invalidation on every mutation — only `delete` bothers to clear it
    /// up front, as a minor optimization.
    pub(crate) fn find(&mut self, key: &[u8]) -> Option<u32> {
        let header = self.header();
        if header.slot_count == 0 {
            return None;
        }

        if header.last_found != NONE {
            let slot = self.get_slot(header.last_found);
            if !slot.is_garbage() && kv::key_matches(self.buf, &slot, key) {
                return Some(header.last_found);
            }
        }

        for i in (0..header.slot_count).rev() {
            let slot = self.get_slot(i);
            if !slot.is_garbage() && kv::key_matches(self.buf, &slot, key) {
                let mut header = self.header();
                header.last_found = i;
                self.set_header(header);
                return Some(i);
            }
        }

        None
    }
}

#[cfg(test)]
mod lookup_test;
