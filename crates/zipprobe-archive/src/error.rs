//! Error types for the archive resolver.

use thiserror::Error;

/// Errors that can occur while resolving ZIP archive structure.
///
/// Every variant is a recoverable value reported to the caller; the
/// resolver never aborts the process on malformed input. A non-matching
/// signature while walking the central directory is the normal end of the
/// sequence and is not represented here.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error opening or mapping the archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File shorter than a comment-less end of central directory record.
    #[error("file too small for an end of central directory record: {len} bytes")]
    FileTooSmall { len: u64 },

    /// The backward scan ran out of file without finding the EOCD magic.
    #[error("could not find end of central directory record")]
    EocdNotFound,

    /// A fixed-size record extended past the end of the file.
    #[error("truncated {what} at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedRecord {
        what: &'static str,
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// A declared variable-length field extended past the end of the file.
    #[error("truncated {what}: needed {needed} bytes, {available} available")]
    TruncatedField {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// A declared payload extended past the end of the file.
    #[error("truncated payload: needed {needed} bytes, {available} available")]
    TruncatedPayload { needed: u64, available: u64 },

    /// A position that must hold a specific structure carries the wrong
    /// magic.
    #[error("invalid signature at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    BadSignature {
        expected: u32,
        actual: u32,
        offset: u64,
    },

    /// A declared length asks for more memory than the archive can supply.
    #[error("declared size {requested} exceeds archive size {available}")]
    AllocationTooLarge { requested: u64, available: u64 },
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;
