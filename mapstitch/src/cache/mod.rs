//! Directory cache for fetched tile rasters.
//!
//! Raw provider responses are stored one file per request, named after the
//! rounded request tuple:
//!
//! ```text
//! {lat}_{lon}_{zoom}_{width}_{height}_{map_type}.img
//! ```
//!
//! Because request centers are rounded, identical fetches always map to the
//! same file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::provider::TileFetchRequest;

/// File extension used for cached rasters.
pub const CACHE_EXTENSION: &str = "img";

/// Errors from cache file operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Result of clearing the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

/// Hit/miss counters for one cache handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

/// Tile cache rooted at a directory.
#[derive(Debug)]
pub struct TileCache {
    dir: PathBuf,
    counters: Mutex<CacheCounters>,
}

impl TileCache {
    /// Opens a cache in `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counters: Mutex::new(CacheCounters::default()),
        }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a request.
    pub fn file_name(request: &TileFetchRequest) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}.{}",
            request.center.latitude(),
            request.center.longitude(),
            request.zoom,
            request.width,
            request.height,
            request.map_type,
            CACHE_EXTENSION
        )
    }

    /// Full path of the cache file for a request.
    pub fn path_for(&self, request: &TileFetchRequest) -> PathBuf {
        self.dir.join(Self::file_name(request))
    }

    /// Returns the cached raster for a request, if present.
    pub fn get(&self, request: &TileFetchRequest) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(request);
        match fs::read(&path) {
            Ok(data) => {
                self.counters.lock().hits += 1;
                debug!(path = %path.display(), bytes = data.len(), "Tile cache hit");
                Ok(Some(data))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.counters.lock().misses += 1;
                Ok(None)
            }
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    /// Stores a raster, returning the path it was written to.
    ///
    /// Data is written to a temporary file and renamed into place, so a
    /// concurrent reader never sees a partial file.
    pub fn put(&self, request: &TileFetchRequest, data: &[u8]) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(request);
        let staging = path.with_extension(format!(
            "{}.{:?}.part",
            CACHE_EXTENSION,
            std::thread::current().id()
        ));
        fs::write(&staging, data).map_err(|source| CacheError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;

        self.counters.lock().writes += 1;
        Ok(path)
    }

    /// Removes the cached raster for a request.
    ///
    /// Returns `Ok(false)` if nothing was cached.
    pub fn remove(&self, request: &TileFetchRequest) -> Result<bool, CacheError> {
        let path = self.path_for(request);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Remove { path, source }),
        }
    }

    /// Deletes every cached raster.
    ///
    /// Files without the cache extension are left alone. A missing cache
    /// directory clears nothing.
    pub fn clear(&self) -> Result<ClearResult, CacheError> {
        let mut result = ClearResult::default();
        for (path, size) in self.entries()? {
            match fs::remove_file(&path) {
                Ok(()) => {
                    result.files_deleted += 1;
                    result.bytes_freed += size;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove cached tile");
                }
            }
        }
        Ok(result)
    }

    /// Returns `(files, bytes)` currently held in the cache directory.
    pub fn stats(&self) -> Result<(usize, u64), CacheError> {
        let entries = self.entries()?;
        let bytes = entries.iter().map(|(_, size)| size).sum();
        Ok((entries.len(), bytes))
    }

    /// Hit/miss counters since this handle was opened.
    pub fn counters(&self) -> CacheCounters {
        *self.counters.lock()
    }

    fn entries(&self) -> Result<Vec<(PathBuf, u64)>, CacheError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            match entry.metadata() {
                Ok(meta) if meta.is_file() => entries.push((path, meta.len())),
                _ => {}
            }
        }
        Ok(entries)
    }
}
