// SPDX-License-Identifier: MIT

//! Byte-level access to the key and value stored in a slot's hunk.
//!
//! A hunk holds the value first, then the key (with its trailing NUL)
//! immediately after it — the same layout the datastore this crate
//! generalizes used to keep every key/value allocation self-terminating.

use crate::slot::Slot;

/// Returns the byte range of the value within the buffer.
#[must_use]
pub const fn value_range(slot: &Slot) -> (usize, usize) {
    let start = slot.heap_offset as usize;
    (start, start + slot.value_len as usize)
}

/// Returns the byte range of the key (not including the trailing NUL)
/// within the buffer.
#[must_use]
pub const fn key_range(slot: &Slot) -> (usize, usize) {
    let start = slot.heap_offset as usize + slot.value_len as usize;
    (start, start + slot.key_len as usize)
}

/// Reads the value bytes for `slot` out of `buf`.
#[must_use]
pub fn read_value<'a>(buf: &'a [u8], slot: &Slot) -> &'a [u8] {
    let (start, end) = value_range(slot);
    &buf[start..end]
}

/// Reads the key bytes (without the trailing NUL) for `slot` out of `buf`.
#[must_use]
pub fn read_key<'a>(buf: &'a [u8], slot: &Slot) -> &'a [u8] {
    let (start, end) = key_range(slot);
    &buf[start..end]
}

/// Writes `key` and `value` into the hunk described by `slot`.
///
/// # Panics
///
/// Panics if `key.len() != slot.key_len as usize` or
/// `value.len() != slot.value_len as usize`, or if the hunk does not fit in
/// `buf`. Callers always size the slot from `key`/`value` immediately
/// before calling this, so these are internal invariants, not user input.
pub fn write_keyvalue(buf: &mut [u8], slot: &Slot, key: &[u8], value: &[u8]) {
    assert_eq!(key.len(), slot.key_len as usize);
    assert_eq!(value.len(), slot.value_len as usize);

    let (value_start, value_end) = value_range(slot);
    buf[value_start..value_end].copy_from_slice(value);

    let (key_start, key_end) = key_range(slot);
    buf[key_start..key_end].copy_from_slice(key);
    buf[key_end] = 0;
}

/// Overwrites only the value bytes of an existing hunk, leaving the key
/// untouched. Used by `update`, which never changes a key.
pub fn write_value(buf: &mut [u8], slot: &Slot, value: &[u8]) {
    assert_eq!(value.len(), slot.value_len as usize);
    let (start, end) = value_range(slot);
    buf[start..end].copy_from_slice(value);
}

/// Compares `slot`'s stored key against `key`.
#[must_use]
pub fn key_matches(buf: &[u8], slot: &Slot, key: &[u8]) -> bool {
    read_key(buf, slot) == key
}

#[cfg(test)]
mod kv_test;
