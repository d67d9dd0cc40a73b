//! Resource store configuration.

use std::path::PathBuf;

use nkar_archive::CacheConfig;

/// Configuration for a [`ResourceStore`](crate::ResourceStore).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StoreConfig {
    /// Directories searched, in order, for relative paths. The working
    /// directory is tried after all of them.
    pub search_paths: Vec<PathBuf>,
    /// Sizing of the archive cache.
    pub cache: CacheConfig,
    /// Extension appended to resource names that have none. `None` disables it.
    pub default_extension: Option<String>,
}

impl StoreConfig {
    pub const DEFAULT_EXTENSION: &'static str = "js";

    /// Add a search path unless it is already configured.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_default_extension(mut self, extension: Option<&str>) -> Self {
        self.default_extension = extension.map(|ext| ext.trim_start_matches('.').to_string());
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            cache: CacheConfig::default(),
            default_extension: Some(Self::DEFAULT_EXTENSION.to_string()),
        }
    }
}
