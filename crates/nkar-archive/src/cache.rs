//! Bounded, thread-safe archive cache.
//!
//! The cache keeps two maps keyed by archive path: parsed archives, and the
//! resident images of archives small enough to keep in memory. Reads served
//! from a resident image avoid reopening the file; reads for an archive whose
//! image has been evicted fall back to a positioned file read.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::archive::{Archive, ArchiveData, EntryStat};
use crate::Result;

/// Cache sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CacheConfig {
    /// Maximum number of parsed archives kept.
    pub directory_capacity: usize,
    /// Maximum number of resident archive images kept.
    pub data_capacity: usize,
    /// Archives larger than this are parsed but never kept resident.
    pub max_resident_bytes: u64,
}

impl CacheConfig {
    pub const DEFAULT_DIRECTORY_CAPACITY: usize = 32;
    pub const DEFAULT_DATA_CAPACITY: usize = 10;
    pub const DEFAULT_MAX_RESIDENT_BYTES: u64 = 16 * 1024 * 1024;

    pub fn with_directory_capacity(mut self, capacity: usize) -> Self {
        self.directory_capacity = capacity;
        self
    }

    pub fn with_data_capacity(mut self, capacity: usize) -> Self {
        self.data_capacity = capacity;
        self
    }

    pub fn with_max_resident_bytes(mut self, bytes: u64) -> Self {
        self.max_resident_bytes = bytes;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory_capacity: Self::DEFAULT_DIRECTORY_CAPACITY,
            data_capacity: Self::DEFAULT_DATA_CAPACITY,
            max_resident_bytes: Self::DEFAULT_MAX_RESIDENT_BYTES,
        }
    }
}

/// A snapshot of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Archives opened and parsed (cache misses that succeeded).
    pub archives_parsed: u64,
    /// Entry reads served from a resident image.
    pub resident_reads: u64,
    /// Entry reads that reopened the archive file.
    pub file_reads: u64,
    /// Parsed archives currently cached.
    pub cached_archives: usize,
    /// Archive images currently resident.
    pub resident_archives: usize,
}

/// A map that evicts its least-recently-inserted keys past a fixed capacity.
#[derive(Debug)]
struct BoundedMap<V> {
    capacity: usize,
    entries: FxHashMap<PathBuf, V>,
    order: VecDeque<PathBuf>,
}

impl<V> BoundedMap<V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: FxHashMap::default(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, key: &Path) -> Option<&V> {
        self.entries.get(key)
    }

    /// Insert or replace. Replacing keeps the key's original insertion slot.
    fn insert(&mut self, key: PathBuf, value: V) {
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!(path = %oldest.display(), "evicting cached archive state");
            self.entries.remove(&oldest);
        }
    }

    fn remove(&mut self, key: &Path) -> Option<V> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct CacheState {
    archives: BoundedMap<Arc<Archive>>,
    data: BoundedMap<Arc<ArchiveData>>,
}

/// Thread-safe cache of parsed archives and resident archive images.
///
/// Construct one per consumer and share it (for example behind an `Arc`).
/// All map access is serialized by a single lock; opening, parsing and
/// decompression run outside it. Failed opens are never cached, so each call
/// retries the open.
pub struct ArchiveCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
    archives_parsed: AtomicU64,
    resident_reads: AtomicU64,
    file_reads: AtomicU64,
}

impl ArchiveCache {
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        let state = CacheState {
            archives: BoundedMap::new(config.directory_capacity),
            data: BoundedMap::new(config.data_capacity),
        };
        Self {
            config,
            state: Mutex::new(state),
            archives_parsed: AtomicU64::new(0),
            resident_reads: AtomicU64::new(0),
            file_reads: AtomicU64::new(0),
        }
    }

    /// Get the cache configuration.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the parsed archive at `path`, opening it on a miss.
    pub fn archive<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Archive>> {
        self.load(path.as_ref()).map(|(archive, _)| archive)
    }

    /// Read and decompress one entry of the archive at `path`.
    pub fn read_entry<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<Vec<u8>> {
        let (archive, data) = self.load(path.as_ref())?;
        match data {
            Some(data) => {
                self.resident_reads.fetch_add(1, Ordering::Relaxed);
                archive.read_with_data(name, &data)
            }
            None => {
                self.file_reads.fetch_add(1, Ordering::Relaxed);
                archive.read(name)
            }
        }
    }

    /// Check whether `name` resolves inside the archive at `path`.
    ///
    /// An archive that cannot be opened contains nothing.
    pub fn exists<P: AsRef<Path>>(&self, path: P, name: &str) -> bool {
        match self.load(path.as_ref()) {
            Ok((archive, _)) => archive.exists(name),
            Err(err) => {
                debug!(path = %path.as_ref().display(), error = %err, "archive unavailable");
                false
            }
        }
    }

    /// Describe an entry of the archive at `path`.
    pub fn stat<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<EntryStat> {
        self.load(path.as_ref())?.0.stat(name)
    }

    /// List the child directories of a folder inside the archive at `path`.
    pub fn list_folder<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<Vec<String>> {
        Ok(self.load(path.as_ref())?.0.list_folder(name))
    }

    /// Whether a parsed archive is cached for `path`.
    pub fn is_cached<P: AsRef<Path>>(&self, path: P) -> bool {
        self.state.lock().archives.get(path.as_ref()).is_some()
    }

    /// Whether an archive image is resident for `path`.
    pub fn is_resident<P: AsRef<Path>>(&self, path: P) -> bool {
        self.state.lock().data.get(path.as_ref()).is_some()
    }

    /// Drop everything cached for `path`.
    pub fn evict<P: AsRef<Path>>(&self, path: P) {
        let mut state = self.state.lock();
        state.archives.remove(path.as_ref());
        state.data.remove(path.as_ref());
    }

    /// Drop everything cached.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.archives.clear();
        state.data.clear();
    }

    /// Get a snapshot of cache counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            archives_parsed: self.archives_parsed.load(Ordering::Relaxed),
            resident_reads: self.resident_reads.load(Ordering::Relaxed),
            file_reads: self.file_reads.load(Ordering::Relaxed),
            cached_archives: state.archives.len(),
            resident_archives: state.data.len(),
        }
    }

    fn load(&self, path: &Path) -> Result<(Arc<Archive>, Option<Arc<ArchiveData>>)> {
        let resident = {
            let state = self.state.lock();
            let data = state.data.get(path).cloned();
            if let Some(archive) = state.archives.get(path) {
                return Ok((Arc::clone(archive), data));
            }
            data
        };

        debug!(path = %path.display(), "archive cache miss");

        // An image can outlive its parsed directory when the data bound is
        // the larger one; reparse from it instead of rereading the file.
        let (archive, data) = match resident {
            Some(data) => (Archive::from_bytes(path, &data)?, Some(data)),
            None => {
                let (archive, data) = Archive::open_with_data(path)?;
                let keep = data.len() as u64 <= self.config.max_resident_bytes;
                (archive, keep.then(|| Arc::new(data)))
            }
        };
        self.archives_parsed.fetch_add(1, Ordering::Relaxed);

        let archive = Arc::new(archive);
        let mut state = self.state.lock();
        state
            .archives
            .insert(path.to_path_buf(), Arc::clone(&archive));
        if let Some(data) = &data {
            state.data.insert(path.to_path_buf(), Arc::clone(data));
        }
        Ok((archive, data))
    }
}

impl Default for ArchiveCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for ArchiveCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
