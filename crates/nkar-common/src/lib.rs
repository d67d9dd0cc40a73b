//! Common utilities for NKAR.
//!
//! - [`BinaryReader`] - Bounds-checked little-endian reading from archive images
//! - [`scan`] - Reverse signature search backed by `memchr`

mod error;
mod reader;

pub mod scan;

pub use error::{Error, Result};
pub use reader::BinaryReader;
