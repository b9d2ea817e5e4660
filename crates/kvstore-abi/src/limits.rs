// SPDX-License-Identifier: MIT

//! Size limits shared by every buffer the store can be initialized over.

/// Maximum length of a key, in bytes, **not** counting the trailing NUL
/// terminator. A key of this length needs `MAX_KEY_LEN + 1` bytes of
/// storage.
pub const MAX_KEY_LEN: usize = 7;

/// Smallest permitted hunk granule. A granule of zero would make hunk-size
/// rounding a no-op and let two different-size hunks compare equal by
/// address alone, which breaks garbage-hunk reuse.
pub const MIN_HUNK_GRANULE: usize = 1;

/// Upper bound on a single value's size, matching the largest buffer this
/// store is meant to be embedded over. Call sites are free to initialize a
/// smaller buffer; this only bounds a single `create`/`update` payload.
pub const MAX_VALUE_SIZE: usize = 0x8000;
