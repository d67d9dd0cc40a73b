//! ZIP format structures.
//!
//! This module contains the low-level record layouts of the classic ZIP
//! format that NKAR archives use: the end of central directory record, the
//! central directory file header and the local file header.

pub mod central_dir;
pub mod eocd;
pub mod local;

pub use central_dir::CentralDirectoryHeader;
pub use eocd::{EocdRecord, Trailer};
pub use local::LocalFileHeader;

/// Compression methods supported in NKAR archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// DEFLATE compression.
    Deflate = 8,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            other => Err(other),
        }
    }
}
