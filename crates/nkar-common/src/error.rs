//! Error types for nkar-common.

use thiserror::Error;

/// Bounds violations raised by [`BinaryReader`](crate::BinaryReader).
#[derive(Debug, Error)]
pub enum Error {
    /// A sequential read ran past the end of the buffer.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// An absolute range does not fit inside the buffer.
    #[error("range {offset}+{length} is outside a buffer of {buffer_len} bytes")]
    OutOfBounds {
        offset: u64,
        length: u64,
        buffer_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
