// SPDX-License-Identifier: MIT

//! The store itself: owns no memory, only a borrow of the caller's buffer,
//! and exposes the public CRUD surface plus the introspection functions
//! needed to size and monitor it.

use kvstore_abi::{StoreError, StoreResult};

use crate::header::{HEADER_SIZE, Header, NONE, read_struct, write_struct};
use crate::kv;
use crate::slot::{SLOT_SIZE, Slot};

/// A key/value datastore living entirely inside a caller-supplied buffer.
///
/// `Store` never allocates; every byte it touches is inside `buf`. Construct
/// one with [`Store::init`] over a fresh buffer, or [`Store::attach`] over a
/// buffer a previous `init` call already wrote a header into.
pub struct Store<'a> {
    pub(crate) buf: &'a mut [u8],
}

impl<'a> Store<'a> {
    /// Initializes a fresh store over `buf`.
    ///
    /// `hunk_granule` is the minimum number of bytes allocated per
    /// key/value pair; every hunk size is rounded up to a multiple of it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadArgument`] if `hunk_granule` is zero, and
    /// [`StoreError::BadSize`] if `buf` is too small to hold even the
    /// header.
    pub fn init(buf: &'a mut [u8], hunk_granule: u32) -> StoreResult<Self> {
        if hunk_granule == 0 {
            return Err(StoreError::BadArgument);
        }
        if buf.len() < HEADER_SIZE {
            return Err(StoreError::BadSize);
        }
        let header = Header::new(buf.len() as u32, hunk_granule);
        // SAFETY: we just checked buf.len() >= HEADER_SIZE.
        unsafe { write_struct(buf, header) };
        Ok(Self { buf })
    }

    /// Attaches to a buffer a previous [`Store::init`] call already wrote a
    /// header into, without resetting its contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadSize`] if `buf` is too small to hold a
    /// header, or if the header's recorded `total_size` does not match
    /// `buf.len()`.
    pub fn attach(buf: &'a mut [u8]) -> StoreResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(StoreError::BadSize);
        }
        // SAFETY: we just checked buf.len() >= HEADER_SIZE.
        let header: Header = unsafe { read_struct(buf) };
        if header.total_size as usize != buf.len() {
            return Err(StoreError::BadSize);
        }
        Ok(Self { buf })
    }

    pub(crate) fn header(&self) -> Header {
        // SAFETY: invariant of Store: buf always holds a valid header.
        unsafe { read_struct(self.buf) }
    }

    pub(crate) fn set_header(&mut self, header: Header) {
        // SAFETY: invariant of Store: buf always holds a valid header.
        unsafe { write_struct(self.buf, header) };
    }

    pub(crate) fn slot_offset(index: u32) -> usize {
        HEADER_SIZE + index as usize * SLOT_SIZE
    }

    pub(crate) fn get_slot(&self, index: u32) -> Slot {
        let offset = Self::slot_offset(index);
        // SAFETY: caller-internal indices are always within slot_count,
        // and the slot stack never overlaps the heap by construction.
        unsafe { read_struct(&self.buf[offset..]) }
    }

    pub(crate) fn set_slot(&mut self, index: u32, slot: Slot) {
        let offset = Self::slot_offset(index);
        // SAFETY: see get_slot.
        unsafe { write_struct(&mut self.buf[offset..], slot) };
    }

    pub(crate) fn invalidate_cache_if(&mut self, index: u32) {
        let mut header = self.header();
        if header.last_found == index {
            header.last_found = NONE;
            self.set_header(header);
        }
    }

    /// Clears the store entirely: all data, the slot stack, and the heap
    /// are reset as if freshly initialized, but `total_size` and
    /// `hunk_granule` are kept.
    pub fn clear(&mut self) {
        let header = self.header();
        self.set_header(Header::new(header.total_size, header.hunk_granule));
    }

    /// Deletes every key/value pair, same as calling [`Store::delete`] on
    /// every key, but without walking the stack: every slot becomes a
    /// tombstone at once and the heap is fully reclaimed. Unlike
    /// [`Store::clear`], the slot stack and heap positions collapse to
    /// empty rather than merely marking entries garbage, since nothing
    /// live remains to reference them.
    pub fn empty(&mut self) {
        let mut header = self.header();
        header.slot_count = 0;
        header.heap_size = 0;
        header.last_found = NONE;
        header.garbage_head = NONE;
        header.garbage_tail = NONE;
        self.set_header(header);
    }

    /// Returns `true` if the store holds no key/value pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header().slot_count == 0
    }

    /// Total size in bytes of the buffer the store was initialized over.
    #[must_use]
    pub fn size(&self) -> usize {
        self.header().total_size as usize
    }

    /// Number of bytes used by the header.
    #[must_use]
    pub fn head_size(&self) -> usize {
        HEADER_SIZE
    }

    /// Number of bytes currently used across header, slot stack, and heap.
    #[must_use]
    pub fn size_used(&self) -> usize {
        let header = self.header();
        HEADER_SIZE + header.slot_count as usize * SLOT_SIZE + header.heap_size as usize
    }

    /// Number of live key/value pairs currently stored. Tombstones (slots
    /// awaiting garbage collection) are not counted; see
    /// [`Store::garbage_count`] for those.
    #[must_use]
    pub fn count(&self) -> usize {
        self.header().slot_count as usize - self.garbage_count()
    }

    /// Maximum key length this store accepts, not counting the trailing
    /// NUL.
    #[must_use]
    pub fn max_key_length(&self) -> usize {
        kvstore_abi::MAX_KEY_LEN
    }

    /// Estimates how many more same-size key/value pairs could be created
    /// before the store runs out of space, assuming no further garbage
    /// collection and no tombstone reuse.
    ///
    /// `keyvalue_size` is `key.len() + value.len()` for the pairs being
    /// sized.
    #[must_use]
    pub fn max_count(&self, keyvalue_size: usize) -> usize {
        let header = self.header();
        // +1 for the trailing NUL every hunk reserves, same as `allocate`.
        let hunk = crate::heap::hunk_size_for(
            header.hunk_granule,
            1,
            keyvalue_size.min(u32::MAX as usize) as u32,
        ) as usize;
        let per_entry = hunk + SLOT_SIZE;
        if per_entry == 0 {
            return 0;
        }
        let free = self.size().saturating_sub(self.size_used());
        free / per_entry
    }

    /// Creates a new key/value pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BadArgument`] if `key` is empty or longer than
    /// [`Store::max_key_length`], [`StoreError::BadSize`] if `value` is
    /// empty, [`StoreError::KeyExists`] if `key` is already present, and
    /// [`StoreError::OutOfSpace`] if the buffer has no room.
    pub fn create(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if key.is_empty() || key.len() > self.max_key_length() || key.contains(&0) {
            return Err(StoreError::BadArgument);
        }
        if value.is_empty() {
            return Err(StoreError::BadSize);
        }
        if value.len() > kvstore_abi::MAX_VALUE_SIZE {
            return Err(StoreError::BadSize);
        }
        if self.find(key).is_some() {
            return Err(StoreError::KeyExists);
        }

        let index = self
            .allocate(key.len() as u8, value.len() as u32)
            .ok_or(StoreError::OutOfSpace)?;
        let slot = self.get_slot(index);
        kv::write_keyvalue(self.buf, &slot, key, value);
        Ok(())
    }

    /// Reads the value stored for `key` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyNotFound`] if `key` is absent, and
    /// [`StoreError::BadSize`] if `out.len()` does not match the stored
    /// value's length.
    pub fn read(&mut self, key: &[u8], out: &mut [u8]) -> StoreResult<()> {
        let index = self.find(key).ok_or(StoreError::KeyNotFound)?;
        let slot = self.get_slot(index);
        if out.len() != slot.value_len as usize {
            return Err(StoreError::BadSize);
        }
        out.copy_from_slice(kv::read_value(self.buf, &slot));
        Ok(())
    }

    /// Returns the length in bytes of the value stored for `key`, or
    /// `None` if `key` is absent.
    #[must_use]
    pub fn read_size(&mut self, key: &[u8]) -> Option<usize> {
        let index = self.find(key)?;
        Some(self.get_slot(index).value_len as usize)
    }

    /// Overwrites the value stored for `key`. The key itself never moves or
    /// changes length.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyNotFound`] if `key` is absent,
    /// [`StoreError::BadArgument`] if `value` is empty, and
    /// [`StoreError::BadSize`] if `value.len()` does not match the stored
    /// value's length.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if value.is_empty() {
            return Err(StoreError::BadArgument);
        }
        let index = self.find(key).ok_or(StoreError::KeyNotFound)?;
        let slot = self.get_slot(index);
        if value.len() != slot.value_len as usize {
            return Err(StoreError::BadSize);
        }
        kv::write_value(self.buf, &slot, value);
        Ok(())
    }

    /// Deletes `key`, turning its hunk into a tombstone available for reuse
    /// or later garbage collection.
    ///
    /// Deleting a key that does not exist is not an error.
    pub fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        let Some(index) = self.find(key) else {
            return Ok(());
        };
        self.invalidate_cache_if(index);
        crate::gc::garbage_list_insert(self, index);
        Ok(())
    }

    /// Compares two slots' stored keys, byte-lexicographically.
    fn compare_keys(&self, a: &Slot, b: &Slot) -> core::cmp::Ordering {
        kv::read_key(self.buf, a).cmp(kv::read_key(self.buf, b))
    }

    /// Swaps two slot records in place. Hunks do not move; only the stack
    /// records trade positions.
    fn swap_slots(&mut self, i: u32, j: u32) {
        if i == j {
            return;
        }
        let a = self.get_slot(i);
        let b = self.get_slot(j);
        self.set_slot(i, b);
        self.set_slot(j, a);
    }

    /// Rebuilds the tombstone list from scratch, in ascending-heap-address
    /// order, from each slot's current `is_garbage` flag. Used after any
    /// operation that reorders the slot stack, since the list's links are
    /// slot indices and a reorder invalidates them all at once.
    fn rebuild_garbage_list(&mut self) {
        let count = self.header().slot_count;
        for i in 0..count {
            let mut slot = self.get_slot(i);
            slot.garbage_prev = NONE;
            slot.garbage_next = NONE;
            self.set_slot(i, slot);
        }

        let mut header = self.header();
        header.garbage_head = NONE;
        header.garbage_tail = NONE;
        header.last_found = NONE;
        self.set_header(header);

        for i in 0..count {
            if self.get_slot(i).is_garbage() {
                crate::gc::garbage_list_insert(self, i);
            }
        }
    }

    /// Reorders the slot stack so that the newest-to-oldest live walk
    /// ([`Store::begin`]/[`Store::next`]) yields keys in ascending byte
    /// order: bubble-sort style, running repeated passes that swap an
    /// adjacent pair whenever the higher-indexed (newer) slot's key sorts
    /// *after* the lower-indexed (older) one's, until a pass makes no
    /// swaps. Hunks never move; invalidates iterators and the tombstone
    /// list's links, both rebuilt here.
    ///
    /// The stack ends up descending by index (index 0 holds the largest
    /// key, the top of the stack the smallest) precisely so that walking
    /// it newest-first produces ascending output — the iterator direction
    /// is fixed, so the sort order is what bends to match it.
    pub fn sort_by_key(&mut self) {
        let count = self.header().slot_count;
        if count < 2 {
            return;
        }

        loop {
            let mut swapped = false;
            for i in 0..count - 1 {
                let a = self.get_slot(i);
                let b = self.get_slot(i + 1);
                if self.compare_keys(&b, &a) == core::cmp::Ordering::Greater {
                    self.swap_slots(i, i + 1);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }

        self.rebuild_garbage_list();
    }

    /// Reorders the slot stack the same way as [`Store::sort_by_key`], but
    /// comparing hunk addresses instead of keys: the newest-to-oldest walk
    /// yields ascending heap offsets.
    pub fn sort_by_heap(&mut self) {
        let count = self.header().slot_count;
        if count < 2 {
            return;
        }

        loop {
            let mut swapped = false;
            for i in 0..count - 1 {
                let a = self.get_slot(i);
                let b = self.get_slot(i + 1);
                if b.heap_offset > a.heap_offset {
                    self.swap_slots(i, i + 1);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }

        self.rebuild_garbage_list();
    }
}

/// Duplicates every live entry of `src` into `dst`.
///
/// # Errors
///
/// Returns [`StoreError::BadArgument`] if `dst` is not empty. Returns
/// whatever error the first failing [`Store::create`] call returns
/// (typically [`StoreError::OutOfSpace`] if `dst` is too small).
pub fn copy(dst: &mut Store<'_>, src: &Store<'_>) -> StoreResult<()> {
    if !dst.is_empty() {
        return Err(StoreError::BadArgument);
    }

    let count = src.header().slot_count;
    for i in 0..count {
        let slot = src.get_slot(i);
        if slot.is_garbage() {
            continue;
        }
        let key = kv::read_key(src.buf, &slot);
        let value = kv::read_value(src.buf, &slot);
        dst.create(key, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod store_test;
