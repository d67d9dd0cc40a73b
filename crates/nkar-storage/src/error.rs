//! Error types for the resource store.

use thiserror::Error;

/// Errors that can occur when resolving resources.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the archive engine.
    #[error(transparent)]
    Archive(#[from] nkar_archive::Error),

    /// I/O error while reading a plain file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The resource (or the archive holding it) could not be located.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The resource is not valid UTF-8 text.
    #[error("resource is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

impl Error {
    /// Whether this error means the resource does not exist, as opposed to
    /// existing but being unreadable.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Archive(err) => err.is_not_found(),
            Error::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            Error::NotFound(_) => true,
            Error::InvalidUtf8(_) => false,
        }
    }
}

/// Result type for resource store operations.
pub type Result<T> = std::result::Result<T, Error>;
