//! Archive handle and the structure resolver.
//!
//! A ZIP archive is resolved back to front: the end of central directory
//! record is found by a bounded backward scan from the end of the file,
//! its recorded offset leads to the central directory, and each directory
//! entry records the offset of the local header that precedes its raw
//! payload. The slice-level operations in this module carry the actual
//! logic; [`ZipArchive`] owns the mapped file and delegates to them.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use zipprobe_common::{ByteReader, Error as ReadError};

use crate::entry::ZipEntry;
use crate::records::{CentralDirRecord, EocdRecord, LocalHeaderRecord};
use crate::{Error, Result};

/// An EOCD record together with its absolute offset in the archive.
#[derive(Debug, Clone, Copy)]
pub struct LocatedEocd {
    /// The decoded record.
    pub record: EocdRecord,
    /// Absolute offset of the record's signature.
    pub offset: u64,
}

impl LocatedEocd {
    /// Offset of the first central directory record.
    #[inline]
    pub fn central_dir_offset(&self) -> u64 {
        u64::from(self.record.central_dir_offset)
    }

    /// Total entry count recorded in the EOCD.
    #[inline]
    pub fn total_entries(&self) -> u64 {
        u64::from(self.record.central_dir_count_total)
    }
}

/// The raw compressed byte range of a single entry.
///
/// `data` spans exactly the `compressed_size` declared by the local
/// header; nothing larger is ever materialized.
#[derive(Debug, Clone, Copy)]
pub struct RawPayload<'a> {
    /// Absolute offset of the payload in the archive.
    pub offset: u64,
    /// The raw, still-compressed bytes.
    pub data: &'a [u8],
}

fn truncated_record(what: &'static str, offset: u64, err: ReadError) -> Error {
    let ReadError::UnexpectedEof { needed, available } = err;
    Error::TruncatedRecord {
        what,
        offset,
        needed,
        available,
    }
}

fn truncated_field(what: &'static str, err: ReadError) -> Error {
    let ReadError::UnexpectedEof { needed, available } = err;
    Error::TruncatedField {
        what,
        needed,
        available,
    }
}

/// Find the end of central directory record.
///
/// The first candidate position is `len - 22`, where the record would sit
/// if the trailing comment were empty. On a signature mismatch the 4-byte
/// candidate window slides back one byte at a time (the seek(-5)/read(4)
/// dance over a stream), bounded at offset 0 so a file with no EOCD
/// terminates in `EocdNotFound` rather than scanning forever. An archive
/// with a comment of length C and no stray magic inside it is found after
/// exactly C+1 candidate reads.
pub fn locate_eocd(data: &[u8]) -> Result<LocatedEocd> {
    if data.len() < EocdRecord::SIZE {
        return Err(Error::FileTooSmall {
            len: data.len() as u64,
        });
    }

    let mut pos = data.len() - EocdRecord::SIZE;
    while data[pos..pos + 4] != EocdRecord::MAGIC {
        if pos == 0 {
            return Err(Error::EocdNotFound);
        }
        pos -= 1;
    }

    let mut reader = ByteReader::new_at(data, pos);
    let record: EocdRecord = reader
        .read_record()
        .map_err(|err| truncated_record("end of central directory record", pos as u64, err))?;
    Ok(LocatedEocd {
        record,
        offset: pos as u64,
    })
}

/// Lazy iterator over the central directory.
///
/// Yields one [`ZipEntry`] per directory record. The sequence ends at the
/// first position whose signature is not the central directory magic - in
/// a well-formed archive that is the EOCD itself - so termination is
/// driven by the stream, never by the EOCD's recorded entry count.
/// Reconciling the two is left to callers. The iterator is fused: a decode
/// failure is yielded once and iteration stops.
pub struct Entries<'a> {
    reader: ByteReader<'a>,
    done: bool,
}

impl<'a> Entries<'a> {
    /// Begin walking the central directory at `central_dir_offset`.
    pub fn new(data: &'a [u8], central_dir_offset: u64) -> Self {
        Self {
            reader: ByteReader::new_at(data, central_dir_offset as usize),
            done: false,
        }
    }

    fn next_entry(&mut self) -> Result<Option<ZipEntry>> {
        let offset = self.reader.position() as u64;

        match self.reader.peek_u32() {
            Ok(signature) if signature != CentralDirRecord::SIGNATURE => return Ok(None),
            Ok(_) => {}
            Err(err) => return Err(truncated_record("central directory record", offset, err)),
        }

        let record: CentralDirRecord = self
            .reader
            .read_record()
            .map_err(|err| truncated_record("central directory record", offset, err))?;

        // Freshly-scoped owned copy; the name's declared length is checked
        // against the remaining bytes before anything is materialized.
        let name = self
            .reader
            .read_bytes(record.file_name_len as usize)
            .map_err(|err| truncated_field("entry name", err))?
            .to_vec();

        self.reader
            .skip(record.trailing_len())
            .map_err(|err| truncated_field("entry extra field and comment", err))?;

        Ok(Some(ZipEntry::new(record, name)))
    }
}

impl Iterator for Entries<'_> {
    type Item = Result<ZipEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Locate the raw compressed payload behind a local header.
///
/// Decodes the local header at `local_header_offset`, skips its name and
/// extra fields per its own declared lengths, and returns the byte range
/// of exactly `compressed_size` bytes that follows. The local header's
/// copies of the name and sizes are not cross-checked against the central
/// directory's.
pub fn raw_payload(data: &[u8], local_header_offset: u64) -> Result<RawPayload<'_>> {
    let mut reader = ByteReader::new_at(data, local_header_offset as usize);
    let record: LocalHeaderRecord = reader
        .read_record()
        .map_err(|err| truncated_record("local file header", local_header_offset, err))?;

    let signature = record.signature;
    if signature != LocalHeaderRecord::SIGNATURE {
        return Err(Error::BadSignature {
            expected: LocalHeaderRecord::SIGNATURE,
            actual: signature,
            offset: local_header_offset,
        });
    }

    reader
        .skip(record.variable_len())
        .map_err(|err| truncated_field("local header name and extra field", err))?;

    let size = record.compressed_size as usize;
    if size > reader.remaining() {
        return Err(Error::TruncatedPayload {
            needed: u64::from(record.compressed_size),
            available: reader.remaining() as u64,
        });
    }

    let start = reader.position();
    Ok(RawPayload {
        offset: start as u64,
        data: &data[start..start + size],
    })
}

/// Read an entry's raw payload into an owned buffer.
///
/// The central directory's declared size is checked against the archive
/// length before any buffer is sized; declared lengths originate in the
/// input file and are not trusted.
pub fn read_raw(data: &[u8], entry: &ZipEntry) -> Result<Vec<u8>> {
    if entry.compressed_size() > data.len() as u64 {
        return Err(Error::AllocationTooLarge {
            requested: entry.compressed_size(),
            available: data.len() as u64,
        });
    }
    let payload = raw_payload(data, entry.local_header_offset())?;
    Ok(payload.data.to_vec())
}

/// An open, read-only archive handle.
///
/// The file is memory-mapped and all resolver operations run over the
/// mapped bytes. One handle serves one resolution flow at a time; a
/// walker's cursor is the only mutable state and there is no internal
/// locking.
pub struct ZipArchive {
    mmap: Mmap,
    name: String,
}

impl ZipArchive {
    /// Open an archive file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self { mmap, name })
    }

    /// File name of the archive.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total length of the archive in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Check if the archive file is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.len() == 0
    }

    /// Find the end of central directory record.
    pub fn locate_eocd(&self) -> Result<LocatedEocd> {
        locate_eocd(&self.mmap)
    }

    /// Walk the central directory starting at `central_dir_offset`.
    pub fn entries(&self, central_dir_offset: u64) -> Entries<'_> {
        Entries::new(&self.mmap, central_dir_offset)
    }

    /// Locate the raw payload behind the local header at the given offset.
    pub fn raw_payload(&self, local_header_offset: u64) -> Result<RawPayload<'_>> {
        raw_payload(&self.mmap, local_header_offset)
    }

    /// Read an entry's raw payload into an owned buffer.
    pub fn read_raw(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        read_raw(&self.mmap, entry)
    }
}

impl std::fmt::Debug for ZipArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("name", &self.name)
            .field("len", &self.mmap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;
    use crate::records::Method;
    use zerocopy::FromZeros;

    // 01-01-2017 15:44:14
    const MOD_DATE: u16 = 0x4A21;
    const MOD_TIME: u16 = (15 << 11) | (44 << 5) | 7;

    struct Fixture {
        name: &'static [u8],
        data: &'static [u8],
        extra: &'static [u8],
        comment: &'static [u8],
    }

    impl Fixture {
        fn plain(name: &'static [u8], data: &'static [u8]) -> Self {
            Self {
                name,
                data,
                extra: b"",
                comment: b"",
            }
        }
    }

    fn write_local_header(buf: &mut Vec<u8>, fixture: &Fixture) {
        buf.write_u32::<LittleEndian>(LocalHeaderRecord::SIGNATURE).unwrap();
        buf.write_u16::<LittleEndian>(20).unwrap(); // version needed
        buf.write_u16::<LittleEndian>(0).unwrap(); // flags
        buf.write_u16::<LittleEndian>(0).unwrap(); // method: stored
        buf.write_u16::<LittleEndian>(MOD_TIME).unwrap();
        buf.write_u16::<LittleEndian>(MOD_DATE).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap(); // crc32
        buf.write_u32::<LittleEndian>(fixture.data.len() as u32).unwrap();
        buf.write_u32::<LittleEndian>(fixture.data.len() as u32).unwrap();
        buf.write_u16::<LittleEndian>(fixture.name.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap(); // no local extra field
        buf.extend_from_slice(fixture.name);
    }

    fn write_central_record(buf: &mut Vec<u8>, fixture: &Fixture, local_header_offset: u32) {
        buf.write_u32::<LittleEndian>(CentralDirRecord::SIGNATURE).unwrap();
        buf.write_u16::<LittleEndian>(20).unwrap(); // version made by
        buf.write_u16::<LittleEndian>(20).unwrap(); // version needed
        buf.write_u16::<LittleEndian>(0).unwrap(); // flags
        buf.write_u16::<LittleEndian>(0).unwrap(); // method: stored
        buf.write_u16::<LittleEndian>(MOD_TIME).unwrap();
        buf.write_u16::<LittleEndian>(MOD_DATE).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap(); // crc32
        buf.write_u32::<LittleEndian>(fixture.data.len() as u32).unwrap();
        buf.write_u32::<LittleEndian>(fixture.data.len() as u32).unwrap();
        buf.write_u16::<LittleEndian>(fixture.name.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(fixture.extra.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(fixture.comment.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap(); // disk number start
        buf.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        buf.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        buf.write_u32::<LittleEndian>(local_header_offset).unwrap();
        buf.extend_from_slice(fixture.name);
        buf.extend_from_slice(fixture.extra);
        buf.extend_from_slice(fixture.comment);
    }

    fn build_archive(fixtures: &[Fixture], archive_comment: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();

        let mut local_offsets = Vec::new();
        for fixture in fixtures {
            local_offsets.push(buf.len() as u32);
            write_local_header(&mut buf, fixture);
            buf.extend_from_slice(fixture.data);
        }

        let central_dir_offset = buf.len() as u32;
        for (fixture, offset) in fixtures.iter().zip(&local_offsets) {
            write_central_record(&mut buf, fixture, *offset);
        }
        let central_dir_size = buf.len() as u32 - central_dir_offset;

        buf.write_u32::<LittleEndian>(EocdRecord::SIGNATURE).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap(); // disk number
        buf.write_u16::<LittleEndian>(0).unwrap(); // central dir disk
        buf.write_u16::<LittleEndian>(fixtures.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(fixtures.len() as u16).unwrap();
        buf.write_u32::<LittleEndian>(central_dir_size).unwrap();
        buf.write_u32::<LittleEndian>(central_dir_offset).unwrap();
        buf.write_u16::<LittleEndian>(archive_comment.len() as u16).unwrap();
        buf.extend_from_slice(archive_comment);

        buf
    }

    fn two_entry_archive(archive_comment: &[u8]) -> Vec<u8> {
        build_archive(
            &[
                Fixture::plain(b"a.txt", b"alpha payload"),
                Fixture::plain(b"b.txt", b"bravo"),
            ],
            archive_comment,
        )
    }

    #[test]
    fn eocd_found_at_first_candidate_without_comment() {
        let data = two_entry_archive(b"");
        let eocd = locate_eocd(&data).unwrap();

        assert_eq!(eocd.offset as usize, data.len() - EocdRecord::SIZE);
        assert_eq!(eocd.total_entries(), 2);
        let comment_length = eocd.record.comment_length;
        assert_eq!(comment_length, 0);
    }

    #[test]
    fn eocd_found_behind_trailing_comment() {
        // 57 comment bytes with no stray magic: the scan steps back
        // exactly once per comment byte.
        let comment = [b'x'; 57];
        let data = two_entry_archive(&comment);
        let eocd = locate_eocd(&data).unwrap();

        assert_eq!(
            eocd.offset as usize,
            data.len() - EocdRecord::SIZE - comment.len()
        );
        let comment_length = eocd.record.comment_length;
        assert_eq!(comment_length as usize, comment.len());
    }

    #[test]
    fn file_shorter_than_record_is_rejected() {
        assert!(matches!(
            locate_eocd(&[0u8; 21]),
            Err(Error::FileTooSmall { len: 21 })
        ));
        assert!(matches!(
            locate_eocd(b""),
            Err(Error::FileTooSmall { len: 0 })
        ));
    }

    #[test]
    fn scan_exhaustion_is_bounded() {
        // No magic anywhere: the scan must stop at offset 0.
        assert!(matches!(locate_eocd(&[0u8; 64]), Err(Error::EocdNotFound)));
    }

    #[test]
    fn empty_archive_has_no_entries() {
        let data = build_archive(&[], b"");
        let eocd = locate_eocd(&data).unwrap();

        assert_eq!(eocd.offset, 0);
        assert_eq!(eocd.total_entries(), 0);
        // The walker starts at the EOCD itself and terminates immediately.
        let entries: Vec<_> = Entries::new(&data, eocd.central_dir_offset()).collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn entries_come_back_in_archive_order() {
        let data = two_entry_archive(b"");
        let eocd = locate_eocd(&data).unwrap();

        let entries: Vec<ZipEntry> = Entries::new(&data, eocd.central_dir_offset())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(entries.len() as u64, eocd.total_entries());
        assert_eq!(entries[0].name(), "a.txt");
        assert_eq!(entries[1].name(), "b.txt");
        assert_eq!(entries[0].compressed_size(), 13);
        assert_eq!(entries[0].method(), Method::Stored);
        assert_eq!(entries[0].mod_date().to_string(), "01-01-2017");
        assert_eq!(entries[0].mod_time().to_string(), "15:44:14");
    }

    #[test]
    fn walker_consumes_extra_and_comment_blocks_exactly() {
        // Non-empty extra and comment blocks on the first record: the
        // cursor must land exactly on the next record's signature.
        let data = build_archive(
            &[
                Fixture {
                    name: b"a.txt",
                    data: b"alpha payload",
                    extra: b"\x7f\x7f\x08\x00opaque!!",
                    comment: b"first entry comment",
                },
                Fixture::plain(b"b.txt", b"bravo"),
            ],
            b"",
        );
        let eocd = locate_eocd(&data).unwrap();

        let entries: Vec<ZipEntry> = Entries::new(&data, eocd.central_dir_offset())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name(), "b.txt");
    }

    #[test]
    fn walker_stops_on_foreign_signature() {
        let data = two_entry_archive(b"");
        let eocd = locate_eocd(&data).unwrap();

        let mut entries = Entries::new(&data, eocd.central_dir_offset());
        assert!(entries.next().unwrap().is_ok());
        assert!(entries.next().unwrap().is_ok());
        // The EOCD's signature terminates the walk, and the iterator
        // stays terminated.
        assert!(entries.next().is_none());
        assert!(entries.next().is_none());
    }

    #[test]
    fn walker_reports_truncated_record() {
        let data = two_entry_archive(b"");
        let eocd = locate_eocd(&data).unwrap();
        let cut = eocd.central_dir_offset() as usize + 20;

        let mut entries = Entries::new(&data[..cut], eocd.central_dir_offset());
        let err = entries.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord { .. }));
        assert!(entries.next().is_none());
    }

    #[test]
    fn walker_reports_truncated_name() {
        // A full fixed record whose declared name length runs past the
        // end of the buffer.
        let mut buf = Vec::new();
        write_central_record(
            &mut buf,
            &Fixture::plain(b"a.txt", b"alpha payload"),
            0,
        );
        buf.truncate(CentralDirRecord::SIZE + 2);

        let err = Entries::new(&buf, 0).next().unwrap().unwrap_err();
        assert!(matches!(err, Error::TruncatedField { what: "entry name", .. }));
    }

    #[test]
    fn payload_range_is_exact() {
        let data = two_entry_archive(b"");
        let eocd = locate_eocd(&data).unwrap();
        let entries: Vec<ZipEntry> = Entries::new(&data, eocd.central_dir_offset())
            .collect::<Result<_>>()
            .unwrap();

        let payload = raw_payload(&data, entries[0].local_header_offset()).unwrap();
        assert_eq!(payload.data, b"alpha payload");
        assert_eq!(payload.data.len() as u64, entries[0].compressed_size());
        assert_eq!(
            payload.offset,
            entries[0].local_header_offset() + LocalHeaderRecord::SIZE as u64 + 5
        );

        let payload = raw_payload(&data, entries[1].local_header_offset()).unwrap();
        assert_eq!(payload.data, b"bravo");
    }

    #[test]
    fn payload_behind_wrong_magic_is_corruption() {
        let data = two_entry_archive(b"");
        let eocd = locate_eocd(&data).unwrap();

        // The central directory offset holds a CDFH, not an LFH.
        let err = raw_payload(&data, eocd.central_dir_offset()).unwrap_err();
        assert!(matches!(
            err,
            Error::BadSignature {
                expected: LocalHeaderRecord::SIGNATURE,
                actual: CentralDirRecord::SIGNATURE,
                ..
            }
        ));
    }

    #[test]
    fn oversized_payload_is_rejected_before_slicing() {
        // A local header whose declared size exceeds the bytes behind it.
        let mut buf = Vec::new();
        write_local_header(
            &mut buf,
            &Fixture::plain(b"x", b"tiny"),
        );
        let size_field = 18; // compressed_size field offset in the LFH
        buf[size_field..size_field + 4].copy_from_slice(&1000u32.to_le_bytes());
        buf.extend_from_slice(b"tiny");

        let err = raw_payload(&buf, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedPayload {
                needed: 1000,
                available: 4
            }
        ));
    }

    #[test]
    fn hostile_declared_size_never_allocates() {
        let data = two_entry_archive(b"");
        let mut record = CentralDirRecord::new_zeroed();
        record.compressed_size = u32::MAX;
        let entry = ZipEntry::new(record, b"evil".to_vec());

        let err = read_raw(&data, &entry).unwrap_err();
        assert!(matches!(
            err,
            Error::AllocationTooLarge {
                requested,
                ..
            } if requested == u64::from(u32::MAX)
        ));
    }

    #[test]
    fn end_to_end_listing_and_extraction() {
        let data = two_entry_archive(b"with a comment");
        let eocd = locate_eocd(&data).unwrap();

        let entries: Vec<ZipEntry> = Entries::new(&data, eocd.central_dir_offset())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(entries.len() as u64, eocd.total_entries());

        let names: Vec<_> = entries.iter().map(|e| e.name().into_owned()).collect();
        assert_eq!(names, ["a.txt", "b.txt"]);

        assert_eq!(read_raw(&data, &entries[0]).unwrap(), b"alpha payload");
        assert_eq!(read_raw(&data, &entries[1]).unwrap(), b"bravo");
    }
}
