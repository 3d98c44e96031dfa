//! Durable title → DOI cache.
//!
//! A flat JSON object mapping raw title strings to resolved DOI strings.
//! An empty string value records "previously looked up, no identifier
//! found", so negative results short-circuit too. The file is replaced
//! atomically on every save.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persistent mapping from raw title to resolved DOI string.
#[derive(Debug)]
pub struct TitleCache {
    entries: HashMap<String, String>,
    path: PathBuf,
}

impl TitleCache {
    /// Load the cache from disk. A missing file is an empty cache, not an
    /// error; a malformed file propagates.
    pub fn load(path: &Path) -> io::Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No cache file at {}, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => return Err(e),
        };

        tracing::debug!("Loaded {} cached resolutions from {}", entries.len(), path.display());
        Ok(Self {
            entries,
            path: path.to_path_buf(),
        })
    }

    /// Create an empty cache backed by `path` without touching disk.
    pub fn empty(path: &Path) -> Self {
        Self {
            entries: HashMap::new(),
            path: path.to_path_buf(),
        }
    }

    /// Cached resolution for a title. `Some("")` means a previous lookup
    /// found nothing.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries.get(title).map(String::as_str)
    }

    pub fn insert(&mut self, title: String, doi: String) {
        self.entries.insert(title, doi);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache to disk, replacing the file atomically.
    pub fn save(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        fs::write(tmp.path(), json)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!("Saved {} resolutions to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}
