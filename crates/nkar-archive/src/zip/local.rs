//! Local file header.

use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Fixed part of a local file header, after its 4-byte signature.
///
/// Only the name and extra lengths are consulted, to find where the payload
/// begins. Method, sizes and CRC are taken from the central directory, which
/// stays authoritative even when the two disagree.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    /// DOS time in the low half, DOS date in the high half.
    pub last_modified: u32,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// `PK\x03\x04`, read little-endian.
    pub const SIGNATURE: u32 = 0x04034b50;

    /// Signature plus fixed fields.
    pub const SIZE: usize = 4 + std::mem::size_of::<Self>();

    /// Bytes of name and extra field between the header and the payload.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize
    }
}
