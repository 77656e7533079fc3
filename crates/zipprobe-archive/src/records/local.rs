//! Local file header record.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Local file header, fixed 30-byte prefix.
///
/// Precedes each entry's data in the archive. Its variable region (file
/// name, then extra field) sits between the fixed prefix and the raw
/// compressed payload of `compressed_size` bytes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalHeaderRecord {
    /// Record signature, must equal [`LocalHeaderRecord::SIGNATURE`]
    pub signature: u32,
    /// Version needed to extract
    pub version_needed: u16,
    /// General purpose bit flag
    pub flags: u16,
    /// Compression method
    pub method: u16,
    /// Last modification time (MS-DOS packed)
    pub mod_time: u16,
    /// Last modification date (MS-DOS packed)
    pub mod_date: u16,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// File name length
    pub file_name_len: u16,
    /// Extra field length
    pub extra_field_len: u16,
}

impl LocalHeaderRecord {
    /// Local file header signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

    /// Local file header signature as u32.
    pub const SIGNATURE: u32 = 0x04034b50;

    /// Fixed size of the record, excluding the variable region.
    pub const SIZE: usize = 30;

    /// Length of the variable region between the fixed prefix and the
    /// payload.
    pub fn variable_len(&self) -> usize {
        self.file_name_len as usize + self.extra_field_len as usize
    }
}
