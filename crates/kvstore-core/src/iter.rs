// SPDX-License-Identifier: MIT

//! Read-only iteration over live slots.
//!
//! [`Cursor`] is the low-level contract spec.md §4.9/§6 names directly:
//! [`Store::begin`]/[`Store::end`]/[`Store::next`]/[`Store::equal`] plus
//! the three projections [`Store::key_of`]/[`Store::value_of`]/
//! [`Store::value_size_of`]. [`Store::iter`] wraps the same walk as a
//! regular [`core::iter::Iterator`] for callers that just want a `for`
//! loop.
//!
//! Any mutating operation on the store — `create`, `delete`, `update`, or
//! any garbage-collection stage — invalidates every outstanding [`Cursor`]
//! and [`Iter`]. Nothing here detects that after the fact; a stale cursor
//! used against a mutated store may walk into an unrelated slot or end
//! early. That is the caller's obligation to avoid, same as the source
//! this generalizes: the public contract only promises validity between
//! mutations.

use crate::kv;
use crate::store::Store;

/// A position in the newest-to-oldest walk over live slots.
///
/// [`Cursor::default`] (and [`Store::end`]) is the sentinel one past the
/// oldest live slot; every other value names a live slot index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor(Option<u32>);

impl<'a> Store<'a> {
    /// Returns a cursor at the newest live slot, or [`Store::end`] if the
    /// store holds no live entries.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        let count = self.header().slot_count;
        self.first_live_at_or_below(count.checked_sub(1))
    }

    /// Returns the sentinel cursor one past the oldest live slot.
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor(None)
    }

    /// Advances `cursor` toward the oldest live slot, skipping tombstones.
    /// Advancing [`Store::end`] returns [`Store::end`].
    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            None => cursor,
            Some(0) => Cursor(None),
            Some(index) => self.first_live_at_or_below(Some(index - 1)),
        }
    }

    /// Whether two cursors name the same position.
    #[must_use]
    pub fn equal(a: Cursor, b: Cursor) -> bool {
        a == b
    }

    /// The key stored at `cursor`.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is [`Store::end`] — callers must stop walking
    /// once a cursor compares equal to `end`, same as dereferencing a C
    /// end iterator would be undefined.
    #[must_use]
    #[expect(
        clippy::expect_used,
        reason = "dereferencing end() is a caller bug, not a recoverable error"
    )]
    pub fn key_of(&self, cursor: Cursor) -> &[u8] {
        let slot = self.get_slot(cursor.0.expect("cursor is at end()"));
        kv::read_key(self.buf, &slot)
    }

    /// The value stored at `cursor`.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is [`Store::end`].
    #[must_use]
    #[expect(
        clippy::expect_used,
        reason = "dereferencing end() is a caller bug, not a recoverable error"
    )]
    pub fn value_of(&self, cursor: Cursor) -> &[u8] {
        let slot = self.get_slot(cursor.0.expect("cursor is at end()"));
        kv::read_value(self.buf, &slot)
    }

    /// The length in bytes of the value stored at `cursor`.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is [`Store::end`].
    #[must_use]
    #[expect(
        clippy::expect_used,
        reason = "dereferencing end() is a caller bug, not a recoverable error"
    )]
    pub fn value_size_of(&self, cursor: Cursor) -> usize {
        let slot = self.get_slot(cursor.0.expect("cursor is at end()"));
        slot.value_len as usize
    }

    /// Walks from `start` (inclusive) downward to the first live slot,
    /// returning [`Store::end`] if every slot at or below `start` is a
    /// tombstone.
    fn first_live_at_or_below(&self, start: Option<u32>) -> Cursor {
        let Some(mut index) = start else {
            return Cursor(None);
        };
        loop {
            if !self.get_slot(index).is_garbage() {
                return Cursor(Some(index));
            }
            match index.checked_sub(1) {
                Some(prev) => index = prev,
                None => return Cursor(None),
            }
        }
    }

    /// A regular [`core::iter::Iterator`] over `(key, value)` pairs,
    /// newest entry first, built on the same cursor walk as
    /// [`Store::begin`]/[`Store::next`].
    #[must_use]
    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            store: self,
            cursor: self.begin(),
        }
    }
}

/// Iterator returned by [`Store::iter`].
pub struct Iter<'s, 'a> {
    store: &'s Store<'a>,
    cursor: Cursor,
}

impl<'s> Iterator for Iter<'s, '_> {
    type Item = (&'s [u8], &'s [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.store.end() {
            return None;
        }
        let key = self.store.key_of(self.cursor);
        let value = self.store.value_of(self.cursor);
        self.cursor = self.store.next(self.cursor);
        Some((key, value))
    }
}

#[cfg(test)]
mod iter_test;
