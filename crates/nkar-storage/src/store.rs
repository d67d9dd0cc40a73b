//! Resource store over archives and plain files.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use nkar_archive::{ArchiveCache, EntryKind, EntryStat};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::{Error, Result};

/// Marks the boundary between an archive file and an entry inside it.
pub const ARCHIVE_MARKER: &str = ".nkar/";

/// The kind of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    File,
    Directory,
    SymbolicLink,
}

impl From<EntryKind> for ResourceKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => ResourceKind::File,
            EntryKind::Directory => ResourceKind::Directory,
        }
    }
}

/// Metadata describing a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceStat {
    pub created: SystemTime,
    pub modified: SystemTime,
    pub size: u64,
    pub path: PathBuf,
    pub kind: ResourceKind,
}

impl From<EntryStat> for ResourceStat {
    fn from(stat: EntryStat) -> Self {
        Self {
            created: stat.created,
            modified: stat.modified,
            size: stat.size,
            path: stat.path,
            kind: stat.kind.into(),
        }
    }
}

/// Split a composite `<archive>.nkar/<entry>` path.
///
/// The marker is matched case-insensitively and the first occurrence wins.
/// Returns the archive file path (ending in the archive extension) and the
/// entry name, or `None` for plain paths.
pub fn split_composite(path: &str) -> Option<(&str, &str)> {
    let index = path.to_ascii_lowercase().find(ARCHIVE_MARKER)?;
    let archive_end = index + ARCHIVE_MARKER.len() - 1;
    Some((&path[..archive_end], &path[archive_end + 1..]))
}

/// Resolves resource paths to bytes, metadata and listings.
///
/// Paths containing `.nkar/` are served from the named archive through a
/// shared [`ArchiveCache`]; all other paths are served from the filesystem.
/// Relative paths are looked up in each search path, then in the working
/// directory.
///
/// The lookup methods collapse every failure into `None`, `false` or an
/// empty listing and log the cause at debug level. Use
/// [`ResourceStore::require_resource`] for resources the caller cannot do
/// without.
#[derive(Debug)]
pub struct ResourceStore {
    config: StoreConfig,
    cache: ArchiveCache,
}

impl ResourceStore {
    pub fn new(config: StoreConfig) -> Self {
        let cache = ArchiveCache::new(config.cache.clone());
        Self { config, cache }
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the archive cache backing composite paths.
    #[inline]
    pub fn cache(&self) -> &ArchiveCache {
        &self.cache
    }

    /// Append a search path unless it is already present.
    pub fn include_search_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.config.search_paths.contains(&path) {
            self.config.search_paths.push(path);
        }
    }

    /// Read a resource as UTF-8 text.
    pub fn get_resource(&self, path: &str) -> Option<String> {
        collapse(path, "get_resource", self.load_text(path))
    }

    /// Read a resource's bytes.
    pub fn get_resource_data(&self, path: &str) -> Option<Vec<u8>> {
        collapse(path, "get_resource_data", self.load_data(path))
    }

    /// Read a resource as UTF-8 text, failing with a typed error.
    pub fn require_resource(&self, path: &str) -> Result<String> {
        self.load_text(path).map_err(|err| {
            warn!(path, error = %err, "required resource unavailable");
            err
        })
    }

    /// Check whether a resource exists.
    pub fn exists(&self, path: &str) -> bool {
        match split_composite(path) {
            Some((archive, entry)) => match self.locate(archive) {
                Ok(archive) => self.cache.exists(&archive, &self.with_extension(entry)),
                Err(err) => {
                    debug!(path, error = %err, "archive not located");
                    false
                }
            },
            None => self.locate(&self.with_extension(path)).is_ok(),
        }
    }

    /// Describe a resource.
    pub fn stat(&self, path: &str) -> Option<ResourceStat> {
        collapse(path, "stat", self.load_stat(path))
    }

    /// List a directory.
    ///
    /// Inside an archive only the immediate child directories are listed.
    /// On the filesystem every entry of the directory is listed, sorted.
    pub fn list_directory(&self, path: &str) -> Vec<String> {
        collapse(path, "list_directory", self.load_listing(path)).unwrap_or_default()
    }

    fn load_data(&self, path: &str) -> Result<Vec<u8>> {
        match split_composite(path) {
            Some((archive, entry)) => {
                let archive = self.locate(archive)?;
                Ok(self.cache.read_entry(&archive, &self.with_extension(entry))?)
            }
            None => {
                let file = self.locate(&self.with_extension(path))?;
                Ok(fs::read(file)?)
            }
        }
    }

    fn load_text(&self, path: &str) -> Result<String> {
        String::from_utf8(self.load_data(path)?).map_err(|_| Error::InvalidUtf8(path.to_string()))
    }

    fn load_stat(&self, path: &str) -> Result<ResourceStat> {
        if let Some((archive, entry)) = split_composite(path) {
            let archive = self.locate(archive)?;
            return Ok(self.cache.stat(&archive, entry)?.into());
        }

        let path = self.locate(path)?;
        let metadata = fs::symlink_metadata(&path)?;
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            ResourceKind::SymbolicLink
        } else if file_type.is_dir() {
            ResourceKind::Directory
        } else {
            ResourceKind::File
        };
        let modified = metadata.modified()?;

        Ok(ResourceStat {
            created: metadata.created().unwrap_or(modified),
            modified,
            size: metadata.len(),
            path,
            kind,
        })
    }

    fn load_listing(&self, path: &str) -> Result<Vec<String>> {
        if let Some((archive, entry)) = split_composite(path) {
            let archive = self.locate(archive)?;
            return Ok(self.cache.list_folder(&archive, entry)?);
        }

        let dir = self.locate(path)?;
        let mut names = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    /// Find a file: absolute paths as-is, then each search path, then the
    /// working directory.
    fn locate(&self, path: &str) -> Result<PathBuf> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            return Ok(candidate.to_path_buf());
        }

        self.config
            .search_paths
            .iter()
            .map(|dir| dir.join(candidate))
            .find(|full| full.exists())
            .or_else(|| candidate.exists().then(|| candidate.to_path_buf()))
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    /// Append the default extension when the last segment has none.
    /// Directory paths are left alone.
    fn with_extension<'a>(&self, name: &'a str) -> Cow<'a, str> {
        let Some(extension) = self.config.default_extension.as_deref() else {
            return Cow::Borrowed(name);
        };
        if name.is_empty() || name.ends_with('/') {
            return Cow::Borrowed(name);
        }

        let last = name.rsplit('/').next().unwrap_or(name);
        if Path::new(last).extension().is_some() {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{name}.{extension}"))
        }
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

fn collapse<T>(path: &str, operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path, operation, error = %err, "resource unavailable");
            None
        }
    }
}
