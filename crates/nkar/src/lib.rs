//! NKAR - read-only application archive engine.
//!
//! This crate provides a unified interface to the NKAR library ecosystem
//! for reading resources packaged into `.nkar` (ZIP) archives.
//!
//! # Crates
//!
//! - [`nkar_common`] - Common utilities (bounds-checked binary reading, byte scanning)
//! - [`nkar_archive`] - Archive parsing, entry decompression and the archive cache
//! - [`nkar_storage`] - Resource store over composite `<archive>.nkar/<entry>` paths
//!
//! # Example
//!
//! ```no_run
//! use nkar::prelude::*;
//!
//! // Open an archive directly
//! let archive = Archive::open("lib-scripting.nkar")?;
//! for folder in archive.list_folder("lib-scripting") {
//!     println!("{folder}/");
//! }
//!
//! // Or go through a resource store
//! let store = ResourceStore::new(StoreConfig::default());
//! if let Some(source) = store.get_resource("lib-scripting.nkar/lib-scripting/timer") {
//!     println!("{} bytes of script", source.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use nkar_archive as archive;
pub use nkar_common as common;
pub use nkar_storage as storage;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use nkar_archive::{
        Archive, ArchiveCache, ArchiveEntry, CacheConfig, CacheStats, EntryKind, EntryStat,
    };
    pub use nkar_common::BinaryReader;
    pub use nkar_storage::{ResourceKind, ResourceStat, ResourceStore, StoreConfig};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
