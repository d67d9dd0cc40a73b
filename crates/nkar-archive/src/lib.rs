//! Read-only reader for NKAR archives.
//!
//! An NKAR archive is a plain ZIP file holding application resources
//! (scripts, HTML, images). This crate supports the classic single-disk
//! layout:
//!
//! - End-of-central-directory discovery past an optional archive comment
//! - Stored (method 0) and DEFLATE (method 8) entries, CRC-32 verified
//! - Exact and `*suffix` wildcard name lookup
//! - Directory listing and per-entry metadata
//! - A bounded, thread-safe cache of parsed archives and resident images
//!
//! ZIP64, multi-disk archives and encrypted entries are rejected.
//!
//! # Example
//!
//! ```no_run
//! use nkar_archive::{ArchiveCache, CacheConfig};
//!
//! let cache = ArchiveCache::new(CacheConfig::default());
//!
//! if cache.exists("app.nkar", "lib-scripting/timer.js") {
//!     let script = cache.read_entry("app.nkar", "lib-scripting/timer.js")?;
//!     println!("{} bytes", script.len());
//! }
//!
//! for folder in cache.list_folder("app.nkar", "lib-scripting")? {
//!     println!("{folder}/");
//! }
//! # Ok::<(), nkar_archive::Error>(())
//! ```

mod archive;
mod cache;
mod decompress;
mod directory;
mod entry;
mod error;
pub mod path;
pub mod zip;

#[cfg(test)]
mod test_support;

pub use archive::{Archive, ArchiveData, EntryStat};
pub use cache::{ArchiveCache, CacheConfig, CacheStats};
pub use decompress::{decompress_entry, inflate_sized};
pub use directory::Directory;
pub use entry::{ArchiveEntry, EntryKind};
pub use error::{Error, Result};
