//! Common utilities for zipprobe.
//!
//! This crate provides the foundational pieces shared by the zipprobe crates:
//!
//! - [`ByteReader`] - bounds-checked binary reading from byte slices
//! - [`Error`]/[`Result`] - the byte-level error pair
//!
//! Multi-byte integers are always unsigned, little-endian and unaligned;
//! there is no implicit padding anywhere in the formats zipprobe decodes.

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::ByteReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
