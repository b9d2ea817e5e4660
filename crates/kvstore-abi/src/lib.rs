// SPDX-License-Identifier: MIT

//! Shared ABI definitions for the in-buffer key/value datastore.
//!
//! This crate defines the contract between the store implementation and any
//! external collaborator embedding it:
//! - Status/error codes returned by every store operation
//! - Size limits that bound keys and the buffer itself
//!
//! # Design Principles
//!
//! - **No dependencies**: Pure data types, 100% host-testable
//! - **`no_std`**: usable from freestanding embedded callers
//!
//! # Modules
//!
//! - [`status`]: `StoreError` and the `Result` alias every operation returns
//! - [`limits`]: `MAX_KEY_LEN`, `MIN_HUNK_GRANULE` and related constants

#![no_std]

pub mod limits;
pub mod status;

pub use limits::{MAX_KEY_LEN, MAX_VALUE_SIZE, MIN_HUNK_GRANULE};
pub use status::{StoreError, StoreResult};
