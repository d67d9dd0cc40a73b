//! End of Central Directory (EOCD) record and trailer location.

use nkar_common::{scan, BinaryReader};
use tracing::debug;
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::{Error, Result};

/// End of Central Directory Record (without signature).
///
/// This is the standard ZIP EOCD record found at the end of the archive.
/// The 4-byte signature (0x06054b50) is read separately before this struct.
/// ZIP64 archives store 0xFFFF or 0xFFFFFFFF sentinels here and keep the
/// real values in a separate record, which this crate does not support.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    /// Number of this disk
    pub disk_number: u16,
    /// Disk where central directory starts
    pub central_dir_disk: u16,
    /// Number of central directory records on this disk
    pub central_dir_count_disk: u16,
    /// Total number of central directory records
    pub central_dir_count_total: u16,
    /// Size of central directory (bytes)
    pub central_dir_size: u32,
    /// Offset of start of central directory
    pub central_dir_offset: u32,
    /// Comment length
    pub comment_length: u16,
}

impl EocdRecord {
    /// EOCD signature bytes.
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

    /// EOCD signature as u32.
    pub const SIGNATURE: u32 = 0x06054b50;

    /// Size of the fixed part of the record, signature included.
    pub const SIZE: usize = 4 + std::mem::size_of::<Self>();

    /// Longest comment the record can declare.
    pub const MAX_COMMENT_LENGTH: usize = u16::MAX as usize;

    /// Check if this archive uses ZIP64 extensions.
    pub fn is_zip64(&self) -> bool {
        self.central_dir_count_total == 0xFFFF
            || self.central_dir_offset == 0xFFFFFFFF
            || self.central_dir_size == 0xFFFFFFFF
    }
}

/// The decoded archive trailer: where the central directory lives and how
/// many records it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trailer {
    /// Offset of the EOCD signature within the archive.
    pub offset: u64,
    /// Offset of the first central directory record.
    pub central_dir_offset: u64,
    /// Size of the central directory in bytes.
    pub central_dir_size: u64,
    /// Number of central directory records.
    pub entry_count: u64,
    /// Archive comment.
    pub comment: Vec<u8>,
}

impl Trailer {
    /// Locate the trailer by scanning the tail of `data` backward.
    ///
    /// Only the last `22 + 65535` bytes are searched. Candidates are tried
    /// rightmost first so that signature bytes occurring inside the comment
    /// of a valid record cannot shadow it; the first candidate whose layout
    /// is consistent with the buffer wins.
    pub fn locate(data: &[u8]) -> Result<Self> {
        let search_start = data
            .len()
            .saturating_sub(EocdRecord::SIZE + EocdRecord::MAX_COMMENT_LENGTH);
        let window = &data[search_start..];

        let mut rejected = None;
        for relative in scan::rfind_iter(&EocdRecord::MAGIC, window) {
            let offset = (search_start + relative) as u64;
            match Self::decode_at(data, offset) {
                Ok(trailer) => return Ok(trailer),
                Err(err) => {
                    debug!(offset, error = %err, "rejected EOCD candidate");
                    rejected.get_or_insert(err);
                }
            }
        }

        Err(rejected.unwrap_or(Error::EocdNotFound))
    }

    fn decode_at(data: &[u8], offset: u64) -> Result<Self> {
        let mut reader = BinaryReader::new_at(data, offset)?;
        reader.skip(EocdRecord::MAGIC.len())?;

        let record: EocdRecord = reader
            .read_struct()
            .map_err(|_| Error::MalformedTrailer(format!("record at {offset} is truncated")))?;

        if record.is_zip64() {
            return Err(Error::Zip64Unsupported);
        }

        let disk_number = record.disk_number;
        let central_dir_disk = record.central_dir_disk;
        let count_disk = record.central_dir_count_disk;
        let count_total = record.central_dir_count_total;
        if disk_number != 0 || central_dir_disk != 0 || count_disk != count_total {
            return Err(Error::MalformedTrailer(
                "multi-disk archives are not supported".to_string(),
            ));
        }

        let comment_length = record.comment_length as usize;
        let comment = reader.read_bytes(comment_length).map_err(|_| {
            Error::MalformedTrailer(format!(
                "comment of {comment_length} bytes overruns the file"
            ))
        })?;

        let central_dir_offset = record.central_dir_offset as u64;
        let central_dir_size = record.central_dir_size as u64;
        if central_dir_offset + central_dir_size > offset {
            return Err(Error::MalformedTrailer(format!(
                "central directory {}+{} overlaps the trailer at {}",
                central_dir_offset, central_dir_size, offset
            )));
        }

        Ok(Self {
            offset,
            central_dir_offset,
            central_dir_size,
            entry_count: count_total as u64,
            comment: comment.to_vec(),
        })
    }
}
