//! Archive: a parsed directory bound to the file it came from.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::decompress::decompress_entry;
use crate::directory::Directory;
use crate::entry::{ArchiveEntry, EntryKind};
use crate::path;
use crate::zip::Trailer;
use crate::{Error, Result};

/// A whole archive image kept in memory.
///
/// The file is read once at open time and owned from then on, so later
/// changes to the file on disk never reach it. Entry payloads are addressed
/// by their absolute offsets inside this image.
pub struct ArchiveData {
    bytes: Vec<u8>,
}

impl ArchiveData {
    /// Read the archive at `path` into memory.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::ArchiveOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { bytes })
    }
}

impl Deref for ArchiveData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for ArchiveData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveData").field("len", &self.len()).finish()
    }
}

/// Metadata describing one archive member, as reported by [`Archive::stat`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryStat {
    /// Creation time. Archives only record one timestamp, so this equals `modified`.
    pub created: SystemTime,
    /// Last modification time.
    pub modified: SystemTime,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Archive path joined with the queried name.
    pub path: PathBuf,
    /// File or directory marker.
    pub kind: EntryKind,
}

/// A read-only archive.
///
/// Holds the archive path and its directory; the directory never changes
/// after construction. Entry data is read either from a caller-provided
/// archive image ([`Archive::read_with_data`]) or by seeking into the file
/// at [`Archive::path`] ([`Archive::read`]). Both produce identical bytes.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    directory: Directory,
    comment: Vec<u8>,
}

impl Archive {
    /// Open and parse the archive at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_data(path).map(|(archive, _)| archive)
    }

    /// Open and parse the archive at `path`, returning the image it was
    /// parsed from so the caller can keep it resident.
    pub fn open_with_data<P: AsRef<Path>>(path: P) -> Result<(Self, ArchiveData)> {
        let path = path.as_ref();
        let data = ArchiveData::read(path)?;
        let archive = Self::from_bytes(path, &data)?;
        Ok((archive, data))
    }

    /// Parse an archive image already in memory. `path` is where the same
    /// image can be re-read from when the image itself is not at hand.
    pub fn from_bytes<P: Into<PathBuf>>(path: P, data: &[u8]) -> Result<Self> {
        let path = path.into();
        let trailer = Trailer::locate(data).map_err(|err| {
            warn!(path = %path.display(), error = %err, "archive trailer not usable");
            err
        })?;
        let directory = Directory::parse(data, &trailer).map_err(|err| {
            warn!(path = %path.display(), error = %err, "archive directory not usable");
            err
        })?;

        debug!(path = %path.display(), entries = directory.len(), "opened archive");
        Ok(Self {
            path,
            directory,
            comment: trailer.comment,
        })
    }

    /// Get the archive path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the archive comment.
    #[inline]
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Get the parsed directory.
    #[inline]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Get the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Iterate over entries in central directory order.
    #[inline]
    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> + '_ {
        self.directory.iter()
    }

    /// Iterate over entry names in central directory order.
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.directory.names()
    }

    /// Resolve a name to an entry.
    ///
    /// Exact names are tried first. A name starting with `*` then matches the
    /// first entry, in directory order, whose name ends with the rest of the
    /// pattern (case-insensitively) and has the same number of segments.
    pub fn resolve(&self, name: &str) -> Option<&ArchiveEntry> {
        if let Some(entry) = self.directory.get(name) {
            return Some(entry);
        }

        let suffix = path::wildcard_suffix(name)?;
        let depth = path::segment_count(suffix);
        let suffix_lower = suffix.to_lowercase();
        let found = self
            .directory
            .iter()
            .find(|entry| path::matches_wildcard(entry.name(), &suffix_lower, depth));

        if let Some(entry) = found {
            debug!(pattern = name, resolved = entry.name(), "wildcard lookup");
        }
        found
    }

    /// Resolve a name or fail with [`Error::EntryNotFound`].
    pub fn entry(&self, name: &str) -> Result<&ArchiveEntry> {
        self.resolve(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }

    /// Read an entry by seeking into the archive file.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.entry(name)?;
        self.read_entry_from_file(entry)
    }

    /// Read an entry from an archive image of this same file.
    pub fn read_with_data(&self, name: &str, data: &[u8]) -> Result<Vec<u8>> {
        let entry = self.entry(name)?;
        Self::read_entry_from_data(entry, data)
    }

    /// Decompress an entry whose payload lies inside `data`.
    pub fn read_entry_from_data(entry: &ArchiveEntry, data: &[u8]) -> Result<Vec<u8>> {
        let payload = nkar_common::BinaryReader::new(data)
            .range(entry.data_offset(), entry.compressed_size())?;
        decompress_entry(entry, payload).map_err(|err| {
            warn!(name = entry.name(), error = %err, "failed to decompress entry");
            err
        })
    }

    /// Decompress an entry after reading its payload from the archive file.
    ///
    /// The file handle lives only for the duration of this call.
    pub fn read_entry_from_file(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let length = usize::try_from(entry.compressed_size()).map_err(|_| {
            Error::Decompression(format!(
                "{} compressed bytes does not fit in memory",
                entry.compressed_size()
            ))
        })?;

        let mut file = File::open(&self.path).map_err(|source| Error::ArchiveOpen {
            path: self.path.clone(),
            source,
        })?;
        file.seek(SeekFrom::Start(entry.data_offset()))?;
        let mut payload = vec![0u8; length];
        file.read_exact(&mut payload)?;
        drop(file);

        decompress_entry(entry, &payload).map_err(|err| {
            warn!(name = entry.name(), error = %err, "failed to decompress entry");
            err
        })
    }

    /// Check whether a name resolves to an entry.
    #[inline]
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Check whether a directory marker exists for `name`.
    pub fn contains_folder(&self, name: &str) -> bool {
        self.exists(&path::as_folder(name))
    }

    /// Describe an entry, falling back to its directory marker.
    pub fn stat(&self, name: &str) -> Result<EntryStat> {
        let entry = self
            .resolve(name)
            .or_else(|| self.resolve(&format!("{name}/")))
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

        let modified = entry.modified();
        Ok(EntryStat {
            created: modified,
            modified,
            size: entry.uncompressed_size(),
            path: self.path.join(name),
            kind: entry.kind(),
        })
    }

    /// List the immediate child directories of a folder.
    ///
    /// Only directory markers one level below `name` are returned, as their
    /// last segment; files inside the folder are not listed. An empty name
    /// lists the top-level directories.
    pub fn list_folder(&self, name: &str) -> Vec<String> {
        let (prefix, depth) = if name.trim_matches('/').is_empty() {
            (String::new(), 2)
        } else {
            let folder = path::as_folder(name);
            let depth = path::segment_count(&folder) + 1;
            (folder.to_lowercase(), depth)
        };

        self.directory
            .names()
            .filter(|candidate| path::is_child_folder(candidate, &prefix, depth))
            .map(|candidate| path::last_segment(candidate).to_string())
            .collect()
    }
}
