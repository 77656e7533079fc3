//! ZIP archive structure resolver.
//!
//! Resolves the structural metadata of a ZIP archive without touching the
//! payload encoding: finds the end of central directory record behind a
//! trailing comment of unknown length, walks the central directory to
//! enumerate entries, and locates each entry's raw compressed byte range
//! via its local header.
//!
//! Payloads are handed out exactly as stored. Decompression, CRC
//! validation, multi-disk archives, ZIP64 extensions and encryption are
//! out of scope.
//!
//! # Example
//!
//! ```no_run
//! use zipprobe_archive::ZipArchive;
//!
//! let archive = ZipArchive::open("sample.zip")?;
//! let eocd = archive.locate_eocd()?;
//! for entry in archive.entries(eocd.central_dir_offset()) {
//!     let entry = entry?;
//!     println!("{}: {} bytes", entry.name(), entry.compressed_size());
//! }
//! # Ok::<(), zipprobe_archive::Error>(())
//! ```

mod archive;
mod entry;
mod error;

pub mod dos;
pub mod records;

pub use archive::{locate_eocd, raw_payload, read_raw, Entries, LocatedEocd, RawPayload, ZipArchive};
pub use entry::ZipEntry;
pub use error::{Error, Result};
