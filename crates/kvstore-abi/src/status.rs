// SPDX-License-Identifier: MIT

//! Status taxonomy returned by every store operation.

use core::fmt;

/// Failure outcomes a store operation can report.
///
/// Distinct tags rather than a single opaque error: callers branch on the
/// specific case (`KeyNotFound` during a `read` is routine; `OutOfSpace`
/// during a `create` usually means "run the garbage collector").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Unspecified failure not covered by a more specific variant.
    Error,
    /// No entry with the given key exists.
    KeyNotFound,
    /// An entry with the given key already exists.
    KeyExists,
    /// A size argument is zero, exceeds a limit, or does not match the
    /// stored size where an exact match is required.
    BadSize,
    /// An argument is otherwise invalid (e.g. an oversized or empty key).
    BadArgument,
    /// The buffer has no room for the requested allocation, even after
    /// accounting for reusable tombstone hunks.
    OutOfSpace,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Error => "unspecified error",
            Self::KeyNotFound => "key not found",
            Self::KeyExists => "key already exists",
            Self::BadSize => "bad size",
            Self::BadArgument => "bad argument",
            Self::OutOfSpace => "out of space",
        };
        f.write_str(msg)
    }
}

/// Result alias used throughout the store's public API.
pub type StoreResult<T> = Result<T, StoreError>;
