//! Central directory entry.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::dos::{self, DosDate, DosTime};
use crate::records::{CentralDirRecord, Method};

/// An entry enumerated from the archive's central directory.
///
/// Holds the decoded fixed record plus the entry's raw name bytes. This is
/// metadata only; use [`ZipArchive::read_raw`](crate::ZipArchive::read_raw)
/// or [`raw_payload`](crate::raw_payload) to reach the entry's payload.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    record: CentralDirRecord,
    name: Vec<u8>,
}

impl ZipEntry {
    pub(crate) fn new(record: CentralDirRecord, name: Vec<u8>) -> Self {
        Self { record, name }
    }

    /// Raw name bytes as stored in the archive.
    ///
    /// The encoding is archive-defined and not validated.
    #[inline]
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// Entry name with any invalid UTF-8 replaced.
    #[inline]
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Compressed size in bytes.
    #[inline]
    pub fn compressed_size(&self) -> u64 {
        u64::from(self.record.compressed_size)
    }

    /// Uncompressed size in bytes.
    #[inline]
    pub fn uncompressed_size(&self) -> u64 {
        u64::from(self.record.uncompressed_size)
    }

    /// Compression method.
    #[inline]
    pub fn method(&self) -> Method {
        Method::from(self.record.method)
    }

    /// CRC-32 of the uncompressed data, as recorded.
    #[inline]
    pub fn crc32(&self) -> u32 {
        self.record.crc32
    }

    /// Offset of the entry's local file header.
    #[inline]
    pub fn local_header_offset(&self) -> u64 {
        u64::from(self.record.local_header_offset)
    }

    /// Modification date decoded from the packed MS-DOS word.
    #[inline]
    pub fn mod_date(&self) -> DosDate {
        dos::date(self.record.mod_date)
    }

    /// Modification time decoded from the packed MS-DOS word.
    #[inline]
    pub fn mod_time(&self) -> DosTime {
        dos::time(self.record.mod_time)
    }

    /// Check if this entry represents a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with(b"/")
    }

    /// Relative path the raw payload is extracted to: the entry name with
    /// `.df` appended, marking data that is still in its stored encoding.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.df", self.name()))
    }
}
