//! Central directory parsing.

use nkar_common::BinaryReader;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::entry::ArchiveEntry;
use crate::zip::{CentralDirectoryHeader, LocalFileHeader, Trailer};
use crate::{Error, Result};

/// The parsed central directory: entries in on-disk order plus a name index.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Vec<ArchiveEntry>,
    index: FxHashMap<String, usize>,
}

impl Directory {
    /// Decode `trailer.entry_count` consecutive records starting at
    /// `trailer.central_dir_offset`.
    ///
    /// Records may not run past the trailer. Each record's local header is
    /// read to find where the payload starts, and the payload range must lie
    /// inside `data`.
    pub fn parse(data: &[u8], trailer: &Trailer) -> Result<Self> {
        let region_len = trailer.offset.saturating_sub(trailer.central_dir_offset);
        let region = BinaryReader::new(data)
            .range(trailer.central_dir_offset, region_len)
            .map_err(|e| Error::MalformedTrailer(e.to_string()))?;

        let mut reader = BinaryReader::new(region);
        let capacity =
            (trailer.entry_count as usize).min(region.len() / CentralDirectoryHeader::SIZE);
        let mut directory = Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::default(),
        };

        for index in 0..trailer.entry_count {
            let entry = Self::read_record(&mut reader, data).map_err(|err| match err {
                Error::Common(_) | Error::InvalidSignature { .. } => Error::MalformedDirectory {
                    index,
                    reason: err.to_string(),
                },
                other => other,
            })?;
            directory.insert(entry);
        }

        debug!(entries = directory.len(), "parsed central directory");
        Ok(directory)
    }

    fn read_record(reader: &mut BinaryReader<'_>, data: &[u8]) -> Result<ArchiveEntry> {
        let sig = reader.read_u32()?;
        if sig != CentralDirectoryHeader::SIGNATURE {
            return Err(Error::InvalidSignature {
                expected: CentralDirectoryHeader::SIGNATURE,
                actual: sig,
            });
        }

        let header: CentralDirectoryHeader = reader.read_struct()?;
        let name = reader.read_string_lossy(header.file_name_length as usize)?;
        reader.skip(header.extra_field_length as usize + header.file_comment_length as usize)?;

        let data_offset = Self::payload_offset(data, header.local_header_offset as u64)?;
        let compressed_size = header.compressed_size as u64;
        BinaryReader::new(data).range(data_offset, compressed_size)?;

        Ok(ArchiveEntry::new(
            name,
            header.compression_method,
            compressed_size,
            header.uncompressed_size as u64,
            data_offset,
            header.crc32,
            header.is_encrypted(),
            header.last_modified,
        ))
    }

    /// Offset of the first payload byte behind the local header at `offset`.
    fn payload_offset(data: &[u8], offset: u64) -> Result<u64> {
        let mut reader = BinaryReader::new_at(data, offset)?;
        let sig = reader.read_u32()?;
        if sig != LocalFileHeader::SIGNATURE {
            return Err(Error::InvalidSignature {
                expected: LocalFileHeader::SIGNATURE,
                actual: sig,
            });
        }

        let header: LocalFileHeader = reader.read_struct()?;
        Ok(offset + LocalFileHeader::SIZE as u64 + header.variable_data_size() as u64)
    }

    fn insert(&mut self, entry: ArchiveEntry) {
        match self.index.get(entry.name()) {
            Some(&slot) => {
                debug!(name = entry.name(), "duplicate entry name, keeping the later record");
                self.entries[slot] = entry;
            }
            None => {
                self.index.insert(entry.name().to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Exact, case-sensitive lookup.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&ArchiveEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    /// Entries in central directory order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveEntry> + '_ {
        self.entries.iter()
    }

    /// Entry names in central directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(ArchiveEntry::name)
    }

    /// Number of distinct entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
