//! ZIP wire-format records.
//!
//! The fixed-size prefixes of the three structures the resolver decodes,
//! each identified by a 4-byte magic. All multi-byte fields are unsigned,
//! little-endian and packed; variable-length blocks follow each fixed
//! prefix in a fixed order and are not part of these structs.

mod central_dir;
mod eocd;
mod local;

pub use central_dir::CentralDirRecord;
pub use eocd::EocdRecord;
pub use local::LocalHeaderRecord;

use std::fmt;

/// Compression method of an archive entry.
///
/// The resolver never inflates payloads; the method is carried through as
/// metadata, so unknown ids are values, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// No compression.
    Stored,
    /// DEFLATE compression.
    Deflated,
    /// Any other method id.
    Other(u16),
}

impl From<u16> for Method {
    fn from(id: u16) -> Self {
        match id {
            0 => Method::Stored,
            8 => Method::Deflated,
            other => Method::Other(other),
        }
    }
}

impl Method {
    /// The method id as stored in the archive.
    pub fn id(self) -> u16 {
        match self {
            Method::Stored => 0,
            Method::Deflated => 8,
            Method::Other(id) => id,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Stored => f.pad("stored"),
            Method::Deflated => f.pad("deflated"),
            Method::Other(id) => f.pad(&format!("method {id}")),
        }
    }
}
