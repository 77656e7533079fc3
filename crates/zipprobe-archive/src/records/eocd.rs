//! End of Central Directory (EOCD) record.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// End of Central Directory record, fixed 22-byte prefix.
///
/// The archive's trailing comment of `comment_length` bytes follows this
/// record immediately. Because the comment length is declared by the
/// record's own last field, the record cannot sit at a fixed distance from
/// the end of the file and has to be found by a backward signature scan.
/// The EOCD is the only self-describing anchor in a ZIP archive; every
/// other structure is reachable only through offsets recorded here.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    /// Record signature, must equal [`EocdRecord::SIGNATURE`]
    pub signature: u32,
    /// Number of this disk
    pub disk_number: u16,
    /// Disk where the central directory starts
    pub central_dir_disk: u16,
    /// Number of central directory records on this disk
    pub central_dir_count_disk: u16,
    /// Total number of central directory records
    pub central_dir_count_total: u16,
    /// Size of the central directory in bytes
    pub central_dir_size: u32,
    /// Offset of the start of the central directory
    pub central_dir_offset: u32,
    /// Length of the trailing archive comment
    pub comment_length: u16,
}

impl EocdRecord {
    /// EOCD signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

    /// EOCD signature as u32.
    pub const SIGNATURE: u32 = 0x06054b50;

    /// Fixed size of the record, excluding the trailing comment.
    pub const SIZE: usize = 22;
}
