//! Central directory file header record.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Central directory file header, fixed 46-byte prefix.
///
/// Describes one entry of the archive. Three variable-length blocks follow
/// the fixed prefix in this order: file name (`file_name_len` bytes), extra
/// field (`extra_field_len` bytes), file comment (`file_comment_len`
/// bytes). Consumption must match the declared lengths exactly or the
/// directory stream desyncs.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CentralDirRecord {
    /// Record signature, must equal [`CentralDirRecord::SIGNATURE`]
    pub signature: u32,
    /// Version made by
    pub version_made_by: u16,
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
    /// File comment length
    pub file_comment_len: u16,
    /// Disk number where the entry starts
    pub disk_number_start: u16,
    /// Internal file attributes
    pub internal_attrs: u16,
    /// External file attributes
    pub external_attrs: u32,
    /// Offset of the entry's local file header
    pub local_header_offset: u32,
}

impl CentralDirRecord {
    /// Central directory signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

    /// Central directory signature as u32.
    pub const SIGNATURE: u32 = 0x02014b50;

    /// Fixed size of the record, excluding the variable blocks.
    pub const SIZE: usize = 46;

    /// Combined length of the extra field and comment blocks that trail
    /// the file name.
    pub fn trailing_len(&self) -> usize {
        self.extra_field_len as usize + self.file_comment_len as usize
    }
}
