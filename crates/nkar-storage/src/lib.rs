//! Resource store for NKAR-packaged applications.
//!
//! Resolves resource paths to bytes, metadata and directory listings. A path
//! containing `.nkar/` names an entry inside an archive (for example
//! `lib-scripting.nkar/lib-scripting/timer.js`); any other path names a plain
//! file. Relative paths are looked up in the configured search paths and then
//! the working directory.
//!
//! # Example
//!
//! ```no_run
//! use nkar_storage::{ResourceStore, StoreConfig};
//!
//! let store = ResourceStore::new(StoreConfig::default().with_search_path("/opt/app"));
//!
//! // `.js` is appended to extension-less names
//! let bootstrap = store.require_resource("lib-scripting.nkar/lib-scripting/init_jsc")?;
//!
//! if let Some(stat) = store.stat("app.nkar/app/index.js") {
//!     println!("{} bytes", stat.size);
//! }
//! # Ok::<(), nkar_storage::Error>(())
//! ```

mod config;
mod error;
mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::{split_composite, ResourceKind, ResourceStat, ResourceStore, ARCHIVE_MARKER};
