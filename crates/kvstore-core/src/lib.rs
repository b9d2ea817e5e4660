// SPDX-License-Identifier: MIT

//! # kvstore-core
//!
//! An embeddable key/value datastore that lives entirely inside one
//! caller-supplied contiguous byte buffer: no dynamic allocation, no file
//! I/O, no operating system services.
//!
//! A single buffer holds two opposing bump regions sharing the same bytes:
//! a slot stack growing up from a small header, and a data heap growing
//! down from the end of the buffer. Deleting an entry turns its slot into
//! a tombstone rather than freeing anything; the caller reclaims tombstone
//! space explicitly, at a moment of their choosing, by running one of the
//! three garbage-collection stages ([`Store::garbage_pop`],
//! [`Store::garbage_fold`], [`Store::garbage_pack`]) or their composition
//! ([`Store::garbage_collect`]/[`Store::garbage_clean`]).
//!
//! # Modules
//!
//! - [`header`]: the buffer header, the fixed record every store starts
//!   with.
//! - [`slot`]: the slot stack, one fixed-size record per key/value pair.
//! - [`heap`]: the downward bump allocator backing every hunk.
//! - [`kv`]: byte-level access to the key and value stored in a hunk.
//! - [`alloc`]: allocation, including tombstone reuse.
//! - [`lookup`]: key lookup with a one-slot cache.
//! - [`store`]: [`Store`] itself and its CRUD surface.
//! - [`gc`]: the tombstone set and the three garbage-collection stages.
//! - [`iter`]: read-only iteration over live slots.
//! - [`serialize`]: textual dump of keys, key/value pairs, and tombstones.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod alloc;
pub mod gc;
pub mod header;
pub mod heap;
pub mod iter;
pub mod kv;
pub mod lookup;
pub mod serialize;
pub mod slot;
pub mod store;

pub use iter::{Cursor, Iter};
pub use serialize::{KeyFormat, TextFormat, ValueFormat};
pub use store::{Store, copy};
