//! Central directory file header.

use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Fixed part of a central directory record, after its 4-byte signature.
///
/// The name, extra field and comment follow immediately, in that order.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    /// General purpose bits; see [`Self::FLAG_ENCRYPTED`].
    pub flags: u16,
    pub compression_method: u16,
    /// DOS time in the low half, DOS date in the high half.
    pub last_modified: u32,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    /// Offset of the entry's local header from the start of the archive.
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    /// `PK\x01\x02`, read little-endian.
    pub const SIGNATURE: u32 = 0x02014b50;

    /// Signature plus fixed fields.
    pub const SIZE: usize = 4 + std::mem::size_of::<Self>();

    pub const FLAG_ENCRYPTED: u16 = 0x0001;

    /// Bytes of name, extra field and comment that follow the fixed fields.
    pub fn variable_data_size(&self) -> usize {
        self.file_name_length as usize
            + self.extra_field_length as usize
            + self.file_comment_length as usize
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags & Self::FLAG_ENCRYPTED != 0
    }
}
