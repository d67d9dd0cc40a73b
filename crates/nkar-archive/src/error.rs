//! Error types for the archive crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with NKAR archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading entry data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bounds or layout error from the binary reader.
    #[error("{0}")]
    Common(#[from] nkar_common::Error),

    /// The archive file could not be opened or read.
    #[error("failed to open archive {}: {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not find the end of central directory record.
    #[error("could not find end of central directory record")]
    EocdNotFound,

    /// An end of central directory record was found but its fields are
    /// inconsistent with the file.
    #[error("malformed end of central directory record: {0}")]
    MalformedTrailer(String),

    /// The archive uses ZIP64 extensions.
    #[error("ZIP64 archives are not supported")]
    Zip64Unsupported,

    /// A central directory record could not be decoded.
    #[error("malformed central directory record {index}: {reason}")]
    MalformedDirectory { index: u64, reason: String },

    /// Invalid ZIP magic bytes.
    #[error("invalid ZIP signature: expected {expected:#010x}, got {actual:#010x}")]
    InvalidSignature { expected: u32, actual: u32 },

    /// Unsupported compression method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Entry is encrypted.
    #[error("entry is encrypted: {0}")]
    Encrypted(String),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Decompressed data does not match the stored checksum.
    #[error("CRC-32 mismatch for {name}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

impl Error {
    /// Whether this error means "nothing usable at that path".
    ///
    /// Callers that present a uniform "not found" outcome (such as the
    /// resource store) use this to collapse open, parse and lookup failures.
    /// An I/O error counts when the file vanished or was cut short after it
    /// was parsed. Decompression and checksum failures are not covered: the
    /// entry exists but its payload is damaged.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::UnexpectedEof
            ),
            Error::ArchiveOpen { .. }
            | Error::EocdNotFound
            | Error::MalformedTrailer(_)
            | Error::Zip64Unsupported
            | Error::MalformedDirectory { .. }
            | Error::InvalidSignature { .. }
            | Error::EntryNotFound(_) => true,
            Error::Common(_)
            | Error::UnsupportedCompression(_)
            | Error::Encrypted(_)
            | Error::Decompression(_)
            | Error::ChecksumMismatch { .. } => false,
        }
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
